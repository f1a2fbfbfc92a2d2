use ::std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, Lines},
    path::{Path, PathBuf},
};
use langtree::CorpusJob;

/// Builds one training job per language subdirectory of `src_dir`.
///
/// The directory name is the language code; every plain text file inside it
/// is read line by line, lazily, in sorted path order. Jobs are returned in
/// language code order.
pub fn corpus_jobs(src_dir: &Path) -> io::Result<Vec<CorpusJob>> {
    let mut lang_dirs = Vec::new();
    for entry in fs::read_dir(src_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            lang_dirs.push(entry.path());
        }
    }
    lang_dirs.sort_unstable();

    let mut jobs = Vec::new();
    for lang_dir in lang_dirs {
        let Some(code) = lang_dir.file_name().and_then(|name| name.to_str()) else {
            continue;
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&lang_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort_unstable();
        tracing::debug!(code, files = files.len(), "language corpus found");

        jobs.push(CorpusJob::new(code, DirLines::new(files)));
    }
    Ok(jobs)
}

/// Lazy line stream over a list of files. A file open failure surfaces as
/// an error item, aborting that language's training without touching the
/// others.
struct DirLines {
    paths: ::std::vec::IntoIter<PathBuf>,
    current: Option<Lines<BufReader<File>>>,
}

impl DirLines {
    #[inline]
    fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths: paths.into_iter(),
            current: None,
        }
    }
}

impl Iterator for DirLines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(lines) = &mut self.current {
                match lines.next() {
                    Some(line) => return Some(line),
                    None => self.current = None,
                }
            }
            let path = self.paths.next()?;
            match File::open(&path) {
                Ok(file) => self.current = Some(BufReader::new(file).lines()),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::std::fs;

    #[test]
    fn test_corpus_jobs_layout() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("fr")).unwrap();
        fs::create_dir(dir.path().join("en")).unwrap();
        fs::write(dir.path().join("en/b.txt"), "second file\n").unwrap();
        fs::write(dir.path().join("en/a.txt"), "first file\nwith two lines\n").unwrap();
        fs::write(dir.path().join("fr/a.txt"), "une ligne\n").unwrap();
        fs::write(dir.path().join("ignored.txt"), "not a language dir\n").unwrap();

        let jobs = corpus_jobs(dir.path()).unwrap();
        let codes: Vec<_> = jobs.iter().map(|job| job.code.as_str()).collect();
        assert_eq!(codes, ["en", "fr"]);

        let en = jobs.into_iter().next().unwrap();
        let lines: Vec<String> = en.lines.map(|line| line.unwrap()).collect();
        assert_eq!(lines, ["first file", "with two lines", "second file"]);
    }

    #[test]
    fn test_missing_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(corpus_jobs(&dir.path().join("absent")).is_err());
    }
}
