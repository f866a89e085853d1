//! Record templates and file framing for the two supported layouts.
//!
//! md380tools reads a length-prefixed file whose first line is the byte
//! count of everything after it. The MD-2017 CPS reads plain lines. The two
//! templates also place their empty column differently.

use std::path::Path;

use userdb_shared::{OutputFormat, Result, User, UserDbError};

/// Format one record as an output line, including its newline.
pub fn format_user(format: OutputFormat, u: &User) -> String {
    match format {
        OutputFormat::Md380Tools => format!(
            "{},{},{},{},{},,{}\n",
            u.id, u.callsign, u.name, u.city, u.state, u.country
        ),
        OutputFormat::Md2017 => format!(
            "{},{},{},,{},{},{}\n",
            u.id, u.callsign, u.name, u.city, u.state, u.country
        ),
    }
}

/// Render the complete file contents for `users`.
pub fn render(format: OutputFormat, users: &[User]) -> String {
    let body: String = users.iter().map(|u| format_user(format, u)).collect();

    match format {
        OutputFormat::Md380Tools => format!("{}\n{body}", body.len()),
        OutputFormat::Md2017 => body,
    }
}

/// Render `users` and write them to `path`, replacing any existing file.
///
/// The file is written next to its target and then renamed into place.
/// Returns the number of bytes written.
pub fn write_file(path: &Path, format: OutputFormat, users: &[User]) -> Result<usize> {
    let file_name = path.file_name().ok_or_else(|| {
        UserDbError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "output path has no file name"),
        )
    })?;
    let temp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let contents = render(format, users);
    let written = std::fs::write(&temp, &contents)
        .map_err(|e| UserDbError::io(&temp, e))
        .and_then(|()| std::fs::rename(&temp, path).map_err(|e| UserDbError::io(path, e)));

    if let Err(e) = written {
        // The temp file may not exist.
        let _ = std::fs::remove_file(&temp);
        return Err(e);
    }

    Ok(contents.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<User> {
        vec![
            User {
                id: "1023001".into(),
                callsign: "VE3THW".into(),
                name: "Wayne".into(),
                city: "Toronto".into(),
                state: "Ontario".into(),
                country: "Canada".into(),
            },
            User::with_callsign("3112345", "W1AW"),
        ]
    }

    #[test]
    fn md380tools_template_places_gap_before_country() {
        let line = format_user(OutputFormat::Md380Tools, &sample()[0]);
        assert_eq!(line, "1023001,VE3THW,Wayne,Toronto,Ontario,,Canada\n");
    }

    #[test]
    fn md2017_template_places_gap_after_name() {
        let line = format_user(OutputFormat::Md2017, &sample()[0]);
        assert_eq!(line, "1023001,VE3THW,Wayne,,Toronto,Ontario,Canada\n");
    }

    #[test]
    fn md380tools_file_is_length_prefixed() {
        let rendered = render(OutputFormat::Md380Tools, &sample());
        let (header, body) = rendered.split_once('\n').unwrap();
        assert_eq!(header.parse::<usize>().unwrap(), body.len());
        assert!(body.ends_with("3112345,W1AW,,,,,\n"));
    }

    #[test]
    fn md2017_file_has_no_header() {
        let rendered = render(OutputFormat::Md2017, &sample());
        assert!(rendered.starts_with("1023001,"));
        assert_eq!(rendered.lines().count(), 2);
    }

    #[test]
    fn empty_database_still_gets_a_header() {
        assert_eq!(render(OutputFormat::Md380Tools, &[]), "0\n");
        assert_eq!(render(OutputFormat::Md2017, &[]), "");
    }

    #[test]
    fn write_file_replaces_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, "stale contents that are longer than the new file\n").unwrap();

        let written = write_file(&path, OutputFormat::Md2017, &sample()[1..]).unwrap();
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, "3112345,W1AW,,,,,\n");
        assert_eq!(written, on_disk.len());
        assert!(!dir.path().join(".users.csv.tmp").exists());
    }

    #[test]
    fn failed_rename_removes_the_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("users.csv");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "x").unwrap();

        let err = write_file(&target, OutputFormat::Md2017, &sample()).unwrap_err();
        assert!(matches!(err, UserDbError::Io { .. }));
        assert!(!dir.path().join(".users.csv.tmp").exists());
        assert!(target.join("keep").exists());
    }
}
