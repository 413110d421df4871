use crate::Problem;
use anyhow::{Context, Result};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Load problem records from a JSON/JSONL file or a directory of them.
///
/// A directory is walked recursively and its `.json`/`.jsonl` files are read in
/// path order, so the resulting document ids are stable between runs.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<Problem>> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else {
        files.push(path.to_path_buf());
    }

    let mut problems = Vec::new();
    for file in files {
        if extension(&file) == Some("jsonl") {
            read_jsonl(&file, &mut problems)?;
        } else {
            read_json(&file, &mut problems)?;
        }
    }
    tracing::debug!(path = %path.display(), records = problems.len(), "corpus loaded");
    Ok(problems)
}

/// Write the corpus as pretty-printed JSON, creating the parent directory if needed.
pub fn save_corpus<P: AsRef<Path>>(path: P, problems: &[Problem]) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, problems)?;
    w.flush()?;
    Ok(())
}

fn extension(p: &Path) -> Option<&str> { p.extension().and_then(|s| s.to_str()) }

fn read_jsonl(file: &Path, out: &mut Vec<Problem>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let problem: Problem = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed record", file.display(), lineno + 1))?;
        out.push(problem);
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<Problem>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("{}: invalid JSON", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for (i, v) in arr.into_iter().enumerate() {
                let problem: Problem = serde_json::from_value(v)
                    .with_context(|| format!("{}: malformed record at index {}", file.display(), i))?;
                out.push(problem);
            }
        }
        serde_json::Value::Object(_) => {
            let problem: Problem = serde_json::from_value(json)
                .with_context(|| format!("{}: malformed record", file.display()))?;
            out.push(problem);
        }
        _ => anyhow::bail!("{}: expected an array of problems", file.display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_array_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("all_problems.json");
        fs::write(&path, r#"[{"title":"A","url":"https://codeforces.com/a"},{"title":"B","description":"d","url":"https://leetcode.com/b","tags":["dp"]}]"#).unwrap();
        let problems = load_corpus(&path).unwrap();
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[1].tags, vec!["dp".to_string()]);
    }

    #[test]
    fn reads_directory_in_name_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.jsonl"), "{\"title\":\"second\",\"url\":\"u2\"}\n\n{\"title\":\"third\",\"url\":\"u3\"}\n").unwrap();
        fs::write(dir.path().join("a.json"), r#"{"title":"first","url":"u1"}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let titles: Vec<String> = load_corpus(dir.path()).unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn malformed_record_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"[{"url":"no title"}]"#).unwrap();
        let err = load_corpus(&path).unwrap_err();
        assert!(format!("{err:#}").contains("malformed record"));
    }

    #[test]
    fn null_optional_fields_are_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        fs::write(&path, r#"[{"title":"A","description":null,"url":"https://codeforces.com/a","tags":null}]"#).unwrap();
        let problems = load_corpus(&path).unwrap();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].missing_description());
        assert!(problems[0].tags.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_corpus(dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn save_then_load_keeps_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus").join("out.json");
        let problems = vec![Problem::new("A", Some("desc"), "https://codeforces.com/a")];
        save_corpus(&path, &problems).unwrap();
        assert_eq!(load_corpus(&path).unwrap(), problems);
    }
}
