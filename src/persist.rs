//! On-disk persistence of trained models.
//!
//! An aggregated [`FrequenciesModel`] is stored as a directory with three
//! text files per category:
//!
//! - `<category>_docCount`: the number of training documents
//! - `<category>_tokenFreq`: one `token<TAB>count` line per token
//! - `<category>_docFreq`: one `token<TAB>document count` line per token
//!
//! Tokens are converted to and from text by caller supplied functions, so
//! any token type can be stored. Frequency lines are written in token order.
//!
//! A [`DocumentVectorsModel`] is stored as a single bincode blob named
//! `MODEL`.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::category::{Category, Token};
use crate::error::{Result, TaxisError};
use crate::frequency::FrequencyTable;
use crate::model::{DocumentVectorsModel, FrequenciesModel, FrequencyProfile};

pub const DOC_COUNT_SUFFIX: &str = "_docCount";
pub const TOKEN_FREQ_SUFFIX: &str = "_tokenFreq";
pub const DOC_FREQ_SUFFIX: &str = "_docFreq";
pub const VECTORS_FILE: &str = "MODEL";

/// Write `table` as `token<TAB>count` lines, ordered by token.
pub fn write_frequencies<T, W, E>(table: &FrequencyTable<T>, writer: W, encode: E) -> Result<()>
where
    T: Token,
    W: Write,
    E: Fn(&T) -> String,
{
    let mut writer = BufWriter::new(writer);
    for (token, count) in table.sorted_entries() {
        let encoded = encode(token);
        if encoded.contains(['\t', '\n', '\r']) {
            return Err(TaxisError::persistence(format!(
                "encoded token {encoded:?} contains a separator"
            )));
        }
        writeln!(writer, "{encoded}\t{count}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read `token<TAB>count` lines into a table. Blank lines are ignored and
/// repeated tokens accumulate.
pub fn read_frequencies<T, R, D>(reader: R, decode: D) -> Result<FrequencyTable<T>>
where
    T: Token,
    R: BufRead,
    D: Fn(&str) -> Result<T>,
{
    let mut table = FrequencyTable::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (token, count) = line.split_once('\t').ok_or_else(|| {
            TaxisError::persistence(format!("line {}: missing tab separator", number + 1))
        })?;
        let count = count.trim().parse::<u64>().map_err(|e| {
            TaxisError::persistence(format!("line {}: bad count {count:?}: {e}", number + 1))
        })?;
        table.advance_by(decode(token)?, count);
    }
    Ok(table)
}

pub fn write_document_count<W: Write>(count: u64, mut writer: W) -> Result<()> {
    write!(writer, "{count}")?;
    writer.flush()?;
    Ok(())
}

pub fn read_document_count<R: Read>(mut reader: R) -> Result<u64> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    text.trim()
        .parse()
        .map_err(|e| TaxisError::persistence(format!("bad document count {:?}: {e}", text.trim())))
}

impl<T: Token> FrequenciesModel<T> {
    /// Store every profile under `directory`, creating it if needed.
    pub fn save<P, E>(&self, directory: P, encode: E) -> Result<()>
    where
        P: AsRef<Path>,
        E: Fn(&T) -> String,
    {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;
        for (category, profile) in self.profiles() {
            let name = file_prefix(category)?;
            write_document_count(
                profile.document_count(),
                File::create(entry_path(directory, name, DOC_COUNT_SUFFIX))?,
            )?;
            write_frequencies(
                profile.token_frequencies(),
                File::create(entry_path(directory, name, TOKEN_FREQ_SUFFIX))?,
                &encode,
            )?;
            write_frequencies(
                profile.document_frequencies(),
                File::create(entry_path(directory, name, DOC_FREQ_SUFFIX))?,
                &encode,
            )?;
        }
        debug!(
            "saved {} category profiles to {}",
            self.profiles().len(),
            directory.display()
        );
        Ok(())
    }

    /// Load a model stored by [`FrequenciesModel::save`].
    ///
    /// Every `<category>_docCount` file found in `directory` defines one
    /// category; its two frequency files must exist alongside.
    pub fn load<P, D>(directory: P, decode: D) -> Result<Self>
    where
        P: AsRef<Path>,
        D: Fn(&str) -> Result<T>,
    {
        let directory = directory.as_ref();
        let mut model = FrequenciesModel::new();
        for entry in fs::read_dir(directory)? {
            let file_name = entry?.file_name();
            let Some(name) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(DOC_COUNT_SUFFIX))
            else {
                continue;
            };

            let document_count =
                read_document_count(File::open(entry_path(directory, name, DOC_COUNT_SUFFIX))?)?;
            let token_frequencies = read_frequencies(
                BufReader::new(File::open(entry_path(directory, name, TOKEN_FREQ_SUFFIX))?),
                &decode,
            )?;
            let document_frequencies = read_frequencies(
                BufReader::new(File::open(entry_path(directory, name, DOC_FREQ_SUFFIX))?),
                &decode,
            )?;
            model.insert_profile(
                Category::new(name),
                FrequencyProfile::from_parts(document_count, token_frequencies, document_frequencies),
            );
        }
        debug!(
            "loaded {} category profiles from {}",
            model.profiles().len(),
            directory.display()
        );
        Ok(model)
    }
}

impl<T: Token + Serialize + DeserializeOwned> DocumentVectorsModel<T> {
    /// Store the model as one bincode blob under `directory`.
    pub fn save<P: AsRef<Path>>(&self, directory: P) -> Result<()> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;
        let mut writer = BufWriter::new(File::create(directory.join(VECTORS_FILE))?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        debug!("saved vector model to {}", directory.display());
        Ok(())
    }

    /// Load a model stored by [`DocumentVectorsModel::save`].
    pub fn load<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let reader = BufReader::new(File::open(directory.as_ref().join(VECTORS_FILE))?);
        Ok(bincode::deserialize_from(reader)?)
    }
}

fn file_prefix(category: &Category) -> Result<&str> {
    let name = category.name();
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(TaxisError::persistence(format!(
            "category {name:?} cannot be used as a file name"
        )));
    }
    Ok(name)
}

fn entry_path(directory: &Path, name: &str, suffix: &str) -> PathBuf {
    directory.join(format!("{name}{suffix}"))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::model::{TokenFrequenciesModel, Trainable};

    fn decode(token: &str) -> Result<String> {
        Ok(token.to_string())
    }

    fn doc(tokens: &[&str]) -> FrequencyTable<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_frequencies_format() {
        let mut buffer = Vec::new();
        write_frequencies(&doc(&["b", "a", "b"]), &mut buffer, |t: &String| t.clone()).unwrap();
        assert_eq!(String::from_utf8(buffer.clone()).unwrap(), "a\t1\nb\t2\n");

        let table = read_frequencies(buffer.as_slice(), decode).unwrap();
        assert_eq!(table, doc(&["b", "a", "b"]));
    }

    #[test]
    fn test_read_frequencies_errors() {
        let error = read_frequencies("a\t1\nno-tab\n".as_bytes(), decode).unwrap_err();
        assert!(matches!(error, TaxisError::Persistence(_)));

        let error = read_frequencies("a\tmany\n".as_bytes(), decode).unwrap_err();
        assert!(matches!(error, TaxisError::Persistence(_)));

        let table = read_frequencies("a\t1\n\na\t2\n".as_bytes(), decode).unwrap();
        assert_eq!(table.get("a"), 3);
    }

    #[test]
    fn test_encoded_separator_rejected() {
        let mut buffer = Vec::new();
        let result = write_frequencies(&doc(&["a\tb"]), &mut buffer, |t: &String| t.clone());
        assert!(result.is_err());
    }

    #[test]
    fn test_document_count() {
        let mut buffer = Vec::new();
        write_document_count(42, &mut buffer).unwrap();
        assert_eq!(read_document_count(buffer.as_slice()).unwrap(), 42);
        assert_eq!(read_document_count(" 7\n".as_bytes()).unwrap(), 7);
        assert!(read_document_count("x".as_bytes()).is_err());
    }

    #[test]
    fn test_frequencies_model_directory() {
        let dir = TempDir::new().unwrap();
        let mut model = FrequenciesModel::new();
        model.train(&doc(&["a", "a", "b"]), &Category::new("cat1"));
        model.train(&doc(&["a"]), &Category::new("cat1"));
        model.train(&doc(&["c"]), &Category::new("cat2"));
        model.save(dir.path(), |t: &String| t.clone()).unwrap();

        assert!(dir.path().join("cat1_docCount").exists());
        assert!(dir.path().join("cat2_tokenFreq").exists());
        let text = fs::read_to_string(dir.path().join("cat1_docFreq")).unwrap();
        assert_eq!(text, "a\t2\nb\t1\n");

        let loaded = FrequenciesModel::load(dir.path(), decode).unwrap();
        assert_eq!(loaded.categories(), model.categories());
        assert_eq!(loaded.sample_counts(), model.sample_counts());
        assert_eq!(loaded.token_frequencies(), model.token_frequencies());
        assert_eq!(
            loaded.total_document_frequencies(),
            model.total_document_frequencies()
        );
    }

    #[test]
    fn test_load_missing_frequency_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lonely_docCount"), "3").unwrap();
        let result = FrequenciesModel::<String>::load(dir.path(), decode);
        assert!(matches!(result, Err(TaxisError::Io(_))));
    }

    #[test]
    fn test_unsafe_category_name() {
        let dir = TempDir::new().unwrap();
        let mut model = FrequenciesModel::new();
        model.train(&doc(&["a"]), &Category::new("../escape"));
        assert!(model.save(dir.path(), |t: &String| t.clone()).is_err());
    }

    #[test]
    fn test_vectors_model_blob() {
        let dir = TempDir::new().unwrap();
        let mut model = DocumentVectorsModel::new();
        model.train(&doc(&["a", "b"]), &Category::new("x"));
        model.train(&doc(&["a"]), &Category::new("x"));
        model.train(&doc(&["c", "c"]), &Category::new("y"));
        model.save(dir.path()).unwrap();
        assert!(dir.path().join(VECTORS_FILE).exists());

        let loaded = DocumentVectorsModel::<String>::load(dir.path()).unwrap();
        assert_eq!(loaded.sample_counts(), model.sample_counts());
        assert_eq!(
            loaded.profiles()[&Category::new("x")].document_vectors(),
            model.profiles()[&Category::new("x")].document_vectors()
        );
    }

    #[test]
    fn test_vectors_model_corrupt_blob() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(VECTORS_FILE), [0xff, 0xff, 0xff]).unwrap();
        let result = DocumentVectorsModel::<String>::load(dir.path());
        assert!(matches!(result, Err(TaxisError::Serialization(_))));
    }
}
