use std::fs::File;
use std::io::Read;

use camino::Utf8Path;

use crate::error::HtanError;
use crate::vocab::columns;

/// One table row, columns kept in header order. Empty values mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Self::new();
        for (name, value) in pairs {
            row.set(name, value);
        }
        row
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Value of `column`, or the empty string when the column is absent.
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Fills an empty participant id from the first biospecimen, which is
    /// named `<participant>_<suffix>`. Rows may list several biospecimens.
    pub fn backfill_participant_id(&mut self) {
        if !self.value(columns::PARTICIPANT_ID).is_empty() {
            return;
        }
        let derived = derive_participant_id(self.value(columns::BIOSPECIMEN));
        self.set(columns::PARTICIPANT_ID, derived);
    }
}

pub fn derive_participant_id(biospecimen: &str) -> String {
    let first = biospecimen.split(',').next().unwrap_or("").replace(' ', "");
    match first.rsplit_once('_') {
        Some((participant, _)) => participant.to_string(),
        None => String::new(),
    }
}

/// Tab-delimited reader with a header row.
pub struct TableReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
}

impl TableReader<File> {
    pub fn open(path: &Utf8Path) -> Result<Self, HtanError> {
        let file =
            File::open(path.as_std_path()).map_err(|_| HtanError::TableRead(path.to_path_buf()))?;
        Self::from_reader(file)
    }
}

impl<R: Read> TableReader<R> {
    pub fn from_reader(input: R) -> Result<Self, HtanError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .has_headers(true)
            .from_reader(input);
        let headers = reader
            .headers()
            .map_err(|err| HtanError::TableParse(err.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();
        if headers.is_empty() {
            return Err(HtanError::TableParse("table has no header row".to_string()));
        }
        Ok(Self { reader, headers })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(self) -> impl Iterator<Item = Result<Row, HtanError>> {
        let TableReader { reader, headers } = self;
        reader.into_records().map(move |record| {
            let record = record.map_err(|err| HtanError::TableParse(err.to_string()))?;
            // short rows leave trailing columns empty, extra fields are dropped
            Ok(Row::from_pairs(headers.iter().enumerate().map(|(idx, name)| {
                (name.clone(), record.get(idx).unwrap_or("").to_string())
            })))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_participant_from_first_biospecimen() {
        assert_eq!(derive_participant_id("HTA9_1_2, HTA9_1_3"), "HTA9_1");
        assert_eq!(derive_participant_id("HTA9 _1_ 5"), "HTA9_1");
        assert_eq!(derive_participant_id("nounderscore"), "");
        assert_eq!(derive_participant_id(""), "");
    }

    #[test]
    fn reads_tab_delimited_rows() {
        let data = "Assay\tLevel\tBiospecimen\nscRNA-seq\t1\tHTA9_1_2\nCODEX\n";
        let reader = TableReader::from_reader(data.as_bytes()).unwrap();
        assert_eq!(reader.headers(), ["Assay", "Level", "Biospecimen"]);
        let rows = reader.rows().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value("Biospecimen"), "HTA9_1_2");
        assert_eq!(rows[1].value("Assay"), "CODEX");
        assert_eq!(rows[1].get("Level"), Some(""));
    }

    #[test]
    fn backfill_keeps_existing_participant() {
        let mut row = Row::from_pairs([
            ("HTAN Participant ID", "HTA9_7"),
            ("Biospecimen", "HTA9_1_2"),
        ]);
        row.backfill_participant_id();
        assert_eq!(row.value("HTAN Participant ID"), "HTA9_7");
    }
}
