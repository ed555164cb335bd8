//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every command that changes the registry reloads the save file, applies
//! the change, and writes the whole document back so sections other than
//! `Constellations` are preserved.

use crate::roster::Roster;
use constellation_core::{
    Color, ConfigNode, Constellation, ConstellationError, Frequency, LifecycleNotifier, Session,
    Settings, document_from_text, document_to_text, is_frequency_valid,
    primitives::MAX_DOCUMENT_SIZE,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE HANDLING
// =============================================================================

/// Files a command works on.
#[derive(Debug, Clone)]
pub struct SessionFiles {
    /// Save file holding the `Constellations` section.
    pub save_file: PathBuf,
    /// Optional TOML settings.
    pub settings: Option<PathBuf>,
    /// Optional JSON vessel roster.
    pub roster: Option<PathBuf>,
}

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ConstellationError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ConstellationError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ConstellationError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate output path: the parent directory must exist.
///
/// Returns the path with its parent canonicalized, so ".." and symlinks in
/// the directory part are resolved before writing.
fn validate_output_path(path: &Path) -> Result<PathBuf, ConstellationError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        ConstellationError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(ConstellationError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| ConstellationError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Read the save file as a document. A missing file is an empty document.
pub fn read_document(path: &Path) -> Result<ConfigNode, ConstellationError> {
    if !path.exists() {
        tracing::info!("Save file {:?} not found, starting from an empty document", path);
        return Ok(ConfigNode::default());
    }
    if !path.is_file() {
        return Err(ConstellationError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    validate_file_size(path, MAX_DOCUMENT_SIZE as u64)?;
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConstellationError::IoError(format!("Read save file: {}", e)))?;
    document_from_text(&text)
}

/// Write a document to the save file.
pub fn write_document(document: &ConfigNode, path: &Path) -> Result<(), ConstellationError> {
    let target = validate_output_path(path)?;
    let text = document_to_text(document)?;
    std::fs::write(&target, text)
        .map_err(|e| ConstellationError::IoError(format!("Write save file: {}", e)))?;
    tracing::debug!("Save file written to {:?}", target);
    Ok(())
}

/// Settings from the given file, or the compiled-in defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConstellationError> {
    match path {
        Some(path) => Settings::load(path),
        None => Ok(Settings::default()),
    }
}

/// Open a session over the save file and roster.
///
/// Returns the session together with the document it was loaded from, so
/// a later save can write the other sections back unchanged.
pub fn load_session(
    files: &SessionFiles,
    notifier: &LifecycleNotifier,
) -> Result<(Session, ConfigNode), ConstellationError> {
    let settings = load_settings(files.settings.as_deref())?;
    let roster = match &files.roster {
        Some(path) => Roster::load(path)?,
        None => Roster::default(),
    };
    let document = read_document(&files.save_file)?;

    let mut session = Session::start(settings, roster, notifier);
    session.load(&document);
    Ok((session, document))
}

/// Save the session's registry into the document and write it out.
pub fn save_session(
    session: &Session,
    mut document: ConfigNode,
    path: &Path,
) -> Result<(), ConstellationError> {
    session.save(&mut document);
    write_document(&document, path)
}

fn parse_color(text: &str) -> Result<Color, ConstellationError> {
    text.parse()
}

fn check_name(name: &str) -> Result<String, ConstellationError> {
    let name = name.trim();
    if name.is_empty() || name.contains(['\n', '\r']) {
        return Err(ConstellationError::MalformedEntry(format!(
            "constellation name '{}' is empty or spans several lines",
            name.escape_debug()
        )));
    }
    Ok(name.to_string())
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Write the default constellation list to a new save file.
pub fn cmd_init(files: &SessionFiles, force: bool) -> Result<(), ConstellationError> {
    if files.save_file.exists() && !force {
        return Err(ConstellationError::IoError(
            "Save file already exists. Use --force to overwrite.".to_string(),
        ));
    }

    let notifier = LifecycleNotifier::new();
    let settings = load_settings(files.settings.as_deref())?;
    let session = Session::start(settings, Roster::default(), &notifier);
    save_session(&session, ConfigNode::default(), &files.save_file)?;

    println!(
        "Initialized {} constellation(s) in {:?}",
        session.registry().len(),
        files.save_file
    );
    session.end();
    Ok(())
}

// =============================================================================
// LIST COMMAND
// =============================================================================

/// List constellations in order with member counts.
pub fn cmd_list(files: &SessionFiles, json_mode: bool) -> Result<(), ConstellationError> {
    let notifier = LifecycleNotifier::new();
    let (mut session, _) = load_session(files, &notifier)?;
    let counts = session.member_counts();

    if json_mode {
        let rows: Vec<serde_json::Value> = session
            .registry()
            .constellations()
            .iter()
            .zip(&counts)
            .map(|(c, (_, members))| {
                serde_json::json!({
                    "frequency": c.frequency,
                    "name": c.name,
                    "color": c.color,
                    "members": members
                })
            })
            .collect();
        print_json(&serde_json::Value::Array(rows));
        return Ok(());
    }

    println!("Constellations");
    println!("==============");
    println!("Save file: {:?}", files.save_file);
    println!();
    println!("{:>9}  {:<24} {:<20} {:>7}", "Frequency", "Name", "Color", "Members");
    for (c, (_, members)) in session.registry().constellations().iter().zip(&counts) {
        println!(
            "{:>9}  {:<24} {:<20} {:>7}",
            c.frequency,
            c.name,
            c.color.to_string(),
            members
        );
    }

    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Show name and colour of a frequency, with fallbacks, and its member count.
pub fn cmd_show(
    files: &SessionFiles,
    json_mode: bool,
    frequency: i64,
) -> Result<(), ConstellationError> {
    let frequency = Frequency::new(frequency)?;
    let notifier = LifecycleNotifier::new();
    let (mut session, _) = load_session(files, &notifier)?;

    let defined = session.registry().find_by_frequency(frequency).is_some();
    let name = session.name_of(frequency).to_string();
    let color = session.color_of(frequency);
    let members = session.count_members(&Constellation::new(frequency, name.clone(), color));

    if json_mode {
        print_json(&serde_json::json!({
            "frequency": frequency,
            "defined": defined,
            "name": name,
            "color": color,
            "members": members
        }));
        return Ok(());
    }

    println!("Frequency: {}", frequency);
    if defined {
        println!("Name:      {}", name);
        println!("Color:     {}", color);
    } else {
        println!("Name:      {} (fallback)", name);
        println!("Color:     {} (fallback)", color);
    }
    println!("Members:   {}", members);

    Ok(())
}

// =============================================================================
// MUTATION COMMANDS
// =============================================================================

/// Add a constellation and save.
pub fn cmd_add(
    files: &SessionFiles,
    frequency: i64,
    name: &str,
    color: Option<&str>,
) -> Result<(), ConstellationError> {
    let frequency = Frequency::new(frequency)?;
    let name = check_name(name)?;
    let color = color.map(parse_color).transpose()?.unwrap_or(Color::WHITE);

    let notifier = LifecycleNotifier::new();
    let (mut session, document) = load_session(files, &notifier)?;
    session
        .registry_mut()
        .insert(Constellation::new(frequency, name.clone(), color))?;
    save_session(&session, document, &files.save_file)?;

    println!("Added constellation '{}' on frequency {}", name, frequency);
    Ok(())
}

/// Rename and/or recolour a constellation and save.
pub fn cmd_edit(
    files: &SessionFiles,
    frequency: i64,
    name: Option<String>,
    color: Option<&str>,
) -> Result<(), ConstellationError> {
    let frequency = Frequency::new(frequency)?;
    let name = name.as_deref().map(check_name).transpose()?;
    let color = color.map(parse_color).transpose()?;

    let notifier = LifecycleNotifier::new();
    let (mut session, document) = load_session(files, &notifier)?;
    let updated = session.registry_mut().update(frequency, name, color)?.clone();
    save_session(&session, document, &files.save_file)?;

    println!(
        "Constellation on frequency {} is now '{}' ({})",
        frequency, updated.name, updated.color
    );
    Ok(())
}

/// Remove a constellation and save. The public frequency is protected.
pub fn cmd_remove(files: &SessionFiles, frequency: i64) -> Result<(), ConstellationError> {
    let frequency = Frequency::new(frequency)?;

    let notifier = LifecycleNotifier::new();
    let (mut session, document) = load_session(files, &notifier)?;
    let public_frequency = session.settings().public_frequency;
    let removed = session
        .registry_mut()
        .remove(frequency, public_frequency)?;
    save_session(&session, document, &files.save_file)?;

    println!(
        "Removed constellation '{}' from frequency {}",
        removed.name, frequency
    );
    Ok(())
}

// =============================================================================
// VESSELS COMMAND
// =============================================================================

/// List eligible vessels from the roster, optionally for one frequency.
pub fn cmd_vessels(
    files: &SessionFiles,
    json_mode: bool,
    frequency: Option<i64>,
) -> Result<(), ConstellationError> {
    let frequency = frequency.map(Frequency::new).transpose()?;
    let notifier = LifecycleNotifier::new();
    let (mut session, _) = load_session(files, &notifier)?;
    let vessels = session.vessels(frequency);

    if json_mode {
        let output = serde_json::to_value(&vessels)
            .map_err(|e| ConstellationError::SerializationError(e.to_string()))?;
        print_json(&output);
        return Ok(());
    }

    match frequency {
        Some(f) => println!("Vessels on frequency {} ({}):", f, session.name_of(f)),
        None => println!("Eligible vessels:"),
    }
    for vessel in &vessels {
        let frequencies: Vec<String> = vessel
            .connection
            .iter()
            .flat_map(|c| c.frequencies.iter().map(ToString::to_string))
            .collect();
        println!(
            "  [{}] {} ({:?}) on {}",
            vessel.id,
            vessel.name,
            vessel.kind,
            frequencies.join(", ")
        );
    }
    println!("Total: {}", vessels.len());

    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Report whether a frequency is in the valid range.
pub fn cmd_check(json_mode: bool, frequency: i64) -> Result<(), ConstellationError> {
    let valid = is_frequency_valid(frequency);

    if json_mode {
        print_json(&serde_json::json!({
            "frequency": frequency,
            "valid": valid
        }));
    } else if valid {
        println!("Frequency {} is valid", frequency);
    } else {
        println!(
            "Frequency {} is invalid (expected {}..={})",
            frequency,
            Frequency::MIN,
            Frequency::MAX
        );
    }

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn files_in(dir: &Path) -> SessionFiles {
        SessionFiles {
            save_file: dir.join("persistent.sfs"),
            settings: None,
            roster: None,
        }
    }

    #[test]
    fn missing_save_file_reads_as_empty_document() {
        let dir = tempfile::tempdir().expect("temp dir");
        let document = read_document(&dir.path().join("absent.sfs")).expect("read");
        assert_eq!(document, ConfigNode::default());
    }

    #[test]
    fn oversized_save_file_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("big.sfs");
        let file = std::fs::File::create(&path).expect("create");
        file.set_len(MAX_DOCUMENT_SIZE as u64 + 1).expect("grow");

        assert!(matches!(
            read_document(&path),
            Err(ConstellationError::SerializationError(_))
        ));
    }

    #[test]
    fn directory_as_save_file_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(matches!(
            read_document(dir.path()),
            Err(ConstellationError::IoError(_))
        ));
    }

    #[test]
    fn output_path_requires_existing_parent() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(validate_output_path(&dir.path().join("missing/out.sfs")).is_err());
        assert!(validate_output_path(&dir.path().join("out.sfs")).is_ok());
    }

    #[test]
    fn check_name_trims_and_rejects_blank() {
        assert_eq!(check_name("  Relay Net ").expect("valid"), "Relay Net");
        assert!(check_name("   ").is_err());
        assert!(check_name("a\nb").is_err());
    }

    #[test]
    fn save_preserves_other_sections() {
        let dir = tempfile::tempdir().expect("temp dir");
        let files = files_in(dir.path());
        std::fs::write(
            &files.save_file,
            "version = 1.12.5\nFLIGHTSTATE\n{\n\tUT = 100\n}\n",
        )
        .expect("seed");

        cmd_add(&files, 7, "Seven", Some("1,0,0,1")).expect("add");

        let document = read_document(&files.save_file).expect("read");
        assert_eq!(document.get_value("version"), Some("1.12.5"));
        assert!(document.has_node("FLIGHTSTATE"));
        let section = document.get_node("Constellations").expect("section");
        assert_eq!(section.nodes().len(), 2);
    }
}
