use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

fn decode_line(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim_end_matches(&['\r', '\n'][..]).to_string()
}

/// Follows a file from its end, handing out lines appended after `open`.
pub struct LogTailer {
    file: File,
    position: u64,
    path: PathBuf,
}

impl LogTailer {
    /// Open `path` and position the cursor at the current end of file.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path_ref = path.as_ref();
        let mut file = File::open(path_ref)?;
        let position = file.seek(SeekFrom::End(0))?;
        Ok(Self {
            file,
            position,
            path: path_ref.to_path_buf(),
        })
    }

    /// Read every complete line appended since the last call.
    ///
    /// A trailing fragment without a newline is still being written; it stays
    /// unread until its terminator arrives.
    pub fn read_new_lines(&mut self) -> io::Result<Vec<String>> {
        let mut lines = Vec::new();

        self.file.seek(SeekFrom::Start(self.position))?;
        let mut reader = BufReader::new(&self.file);
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            let bytes_read = reader.read_until(b'\n', &mut buffer)?;
            if bytes_read == 0 || buffer.last() != Some(&b'\n') {
                break;
            }
            self.position += bytes_read as u64;
            lines.push(decode_line(&buffer));
        }

        Ok(lines)
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Call `f` with every line of the file, start to finish.
pub fn for_each_line(path: impl AsRef<Path>, mut f: impl FnMut(&str)) -> io::Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        f(&decode_line(&buffer));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;
    use tempfile::tempdir;

    fn append(path: &Path, text: &str) {
        let mut file = OpenOptions::new().append(true).open(path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file.sync_all().unwrap();
    }

    #[test]
    fn test_tailer_skips_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "old line 1\nold line 2\n").unwrap();

        let mut tailer = LogTailer::open(&path).unwrap();
        assert_eq!(tailer.position(), 22);
        assert!(tailer.read_new_lines().unwrap().is_empty());

        append(&path, "new line\r\n");
        assert_eq!(tailer.read_new_lines().unwrap(), vec!["new line"]);
        assert!(tailer.read_new_lines().unwrap().is_empty());
    }

    #[test]
    fn test_tailer_waits_for_line_terminator() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "").unwrap();

        let mut tailer = LogTailer::open(&path).unwrap();
        append(&path, "first\nsec");
        assert_eq!(tailer.read_new_lines().unwrap(), vec!["first"]);

        append(&path, "ond\n");
        assert_eq!(tailer.read_new_lines().unwrap(), vec!["second"]);
    }

    #[test]
    fn test_for_each_line_reads_whole_file_lossily() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"alpha\nbad \xff byte\nlast without newline").unwrap();

        let mut lines = Vec::new();
        for_each_line(&path, |line| lines.push(line.to_string())).unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "alpha");
        assert_eq!(lines[1], "bad \u{fffd} byte");
        assert_eq!(lines[2], "last without newline");
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        assert!(LogTailer::open(dir.path().join("missing.log")).is_err());
    }
}
