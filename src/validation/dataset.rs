//! Labelled samples and named data sets.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use bit_vec::BitVec;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{Result, TaxisError};

/// A datum together with its true category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sample<D> {
    pub data: D,
    pub category: Category,
}

impl<D> Sample<D> {
    pub fn new(data: D, category: Category) -> Self {
        Sample { data, category }
    }
}

/// A named, in-memory collection of samples.
///
/// Samples are shared, so splitting a data set never copies them.
#[derive(Debug)]
pub struct DataSet<D> {
    name: String,
    samples: Arc<Vec<Sample<D>>>,
}

impl<D> Clone for DataSet<D> {
    fn clone(&self) -> Self {
        DataSet {
            name: self.name.clone(),
            samples: Arc::clone(&self.samples),
        }
    }
}

impl<D> DataSet<D> {
    pub fn new<S: Into<String>>(name: S, samples: Vec<Sample<D>>) -> Self {
        DataSet {
            name: name.into(),
            samples: Arc::new(samples),
        }
    }

    /// Build a data set from `(data, category)` pairs.
    pub fn from_pairs<S, I, C>(name: S, pairs: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (D, C)>,
        C: Into<Category>,
    {
        let samples = pairs
            .into_iter()
            .map(|(data, category)| Sample::new(data, category.into()))
            .collect();
        Self::new(name, samples)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[Sample<D>] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub(crate) fn split(&self, name: String, train: BitVec, test: BitVec) -> SplitDataSet<D> {
        SplitDataSet {
            name,
            samples: Arc::clone(&self.samples),
            train,
            test,
        }
    }
}

impl DataSet<String> {
    /// Read `category<TAB>text` lines. Lines without a tab are skipped.
    pub fn from_labeled_lines<S: Into<String>, R: BufRead>(name: S, reader: R) -> Result<Self> {
        let mut samples = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if let Some((category, text)) = line.split_once('\t') {
                samples.push(Sample::new(text.to_string(), Category::new(category)));
            }
        }
        Ok(Self::new(name, samples))
    }

    /// Load a file of labelled lines, named after the file.
    pub fn load_labeled_lines<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_labeled_lines(name, BufReader::new(File::open(path)?))
    }

    /// Read one sample per CSV record laid out as `format` describes.
    ///
    /// Records may have different lengths, but every record must contain both
    /// the data and the category column.
    pub fn from_csv_records<S: Into<String>, R: Read>(name: S, reader: R, format: &CsvFormat) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(format.has_header)
            .delimiter(format.separator)
            .quote(format.quote)
            .flexible(true)
            .from_reader(reader);

        let mut samples = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let field = |column: usize| {
                record.get(column).ok_or_else(|| {
                    TaxisError::invalid_argument(format!(
                        "CSV record {} has no column {}",
                        index + 1,
                        column
                    ))
                })
            };
            let data = field(format.data_field)?;
            let category = field(format.category_field)?;
            samples.push(Sample::new(data.to_string(), Category::new(category)));
        }
        Ok(Self::new(name, samples))
    }

    /// Load a CSV file, named after the file.
    pub fn load_csv_records<P: AsRef<Path>>(path: P, format: &CsvFormat) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_csv_records(name, File::open(path)?, format)
    }
}

/// Layout of a CSV file holding one sample per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvFormat {
    data_field: usize,
    category_field: usize,
    has_header: bool,
    separator: u8,
    quote: u8,
}

impl CsvFormat {
    /// Take the text from column `data_field` and the category from column
    /// `category_field`. The first record is a header; fields are separated
    /// by `,` and quoted with `"`.
    pub fn new(data_field: usize, category_field: usize) -> Self {
        CsvFormat {
            data_field,
            category_field,
            has_header: true,
            separator: b',',
            quote: b'"',
        }
    }

    /// Set whether the first record is a header to skip.
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the field separator.
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Set the quotation mark.
    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

/// A data set divided into a training part and a test part.
///
/// Both parts are views over the samples of the source data set, selected by
/// membership masks and yielded in the original order.
#[derive(Debug)]
pub struct SplitDataSet<D> {
    name: String,
    samples: Arc<Vec<Sample<D>>>,
    train: BitVec,
    test: BitVec,
}

impl<D> SplitDataSet<D> {
    /// Name of the source data set and the split policy.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn train_samples(&self) -> impl Iterator<Item = &Sample<D>> {
        Self::masked(&self.samples, &self.train)
    }

    pub fn test_samples(&self) -> impl Iterator<Item = &Sample<D>> {
        Self::masked(&self.samples, &self.test)
    }

    pub fn train_len(&self) -> usize {
        self.train.iter().filter(|member| *member).count()
    }

    pub fn test_len(&self) -> usize {
        self.test.iter().filter(|member| *member).count()
    }

    fn masked<'a>(samples: &'a [Sample<D>], mask: &'a BitVec) -> impl Iterator<Item = &'a Sample<D>> {
        samples
            .iter()
            .zip(mask.iter())
            .filter_map(|(sample, member)| member.then_some(sample))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_pairs() {
        let dataset = DataSet::from_pairs("toy", [("a b", "x"), ("c", "y")]);
        assert_eq!(dataset.name(), "toy");
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.samples()[1], Sample::new("c", Category::new("y")));
    }

    #[test]
    fn test_labeled_lines() {
        let input = "spam\tbuy now\nno tab here\nham\tsee you at lunch\tok\n";
        let dataset = DataSet::from_labeled_lines("mail", input.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.samples()[0].category, Category::new("spam"));
        assert_eq!(dataset.samples()[1].data, "see you at lunch\tok");
    }

    #[test]
    fn test_csv_records() {
        let input = "id,text,label\n1,buy now,spam\n2,\"lunch, then agenda\",ham\n";
        let dataset = DataSet::from_csv_records("mail", input.as_bytes(), &CsvFormat::new(1, 2)).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.samples()[0], Sample::new("buy now".to_string(), Category::new("spam")));
        assert_eq!(dataset.samples()[1].data, "lunch, then agenda");
        assert_eq!(dataset.samples()[1].category, Category::new("ham"));
    }

    #[test]
    fn test_csv_custom_format() {
        let input = "spam;'buy; now'\nham;lunch\n";
        let format = CsvFormat::new(1, 0)
            .with_header(false)
            .with_separator(b';')
            .with_quote(b'\'');
        let dataset = DataSet::from_csv_records("mail", input.as_bytes(), &format).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.samples()[0].data, "buy; now");
        assert_eq!(dataset.samples()[1].category, Category::new("ham"));
    }

    #[test]
    fn test_csv_missing_column() {
        let input = "text,label\nbuy now,spam\nlonely\n";
        let result = DataSet::from_csv_records("mail", input.as_bytes(), &CsvFormat::new(0, 1));
        assert!(matches!(result, Err(TaxisError::InvalidArgument(_))));
    }

    #[test]
    fn test_load_csv_records() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "text,label").unwrap();
        writeln!(file, "first,x").unwrap();
        file.flush().unwrap();

        let dataset = DataSet::load_csv_records(file.path(), &CsvFormat::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.samples()[0].category, Category::new("x"));
    }

    #[test]
    fn test_load_labeled_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "x\tfirst").unwrap();
        writeln!(file, "y\tsecond").unwrap();
        file.flush().unwrap();

        let dataset = DataSet::load_labeled_lines(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(DataSet::load_labeled_lines("/nonexistent/corpus.tsv").is_err());
    }

    #[test]
    fn test_split_views_share_samples() {
        let dataset = DataSet::from_pairs("toy", [(1, "x"), (2, "x"), (3, "y")]);
        let split = dataset.split(
            "toy(custom)".to_string(),
            BitVec::from_fn(3, |i| i != 1),
            BitVec::from_fn(3, |i| i == 1),
        );
        let train: Vec<i32> = split.train_samples().map(|s| s.data).collect();
        let test: Vec<i32> = split.test_samples().map(|s| s.data).collect();
        assert_eq!(train, vec![1, 3]);
        assert_eq!(test, vec![2]);
        assert_eq!(split.train_len(), 2);
        assert_eq!(split.test_len(), 1);
    }
}
