use crate::error::{GeneticsError, Result};
use crate::genetics::{DogGenotype, Locus};
use crate::trait_group::TraitGroup;
use log::debug;
use std::collections::HashSet;
use std::io::Read;

#[derive(Clone)]
enum Field {
    Name,
    Locus(Locus),
    Meta,
}

/// Produces `DogGenotype`s from delimited genetic test results.
///
/// Each row is one animal; each locus column holds a genotype such as `Ee`
/// or `E/e`. Empty cells leave the locus untested.
pub struct Csv {
    records: std::iter::Enumerate<csv::StringRecordsIntoIter<Box<dyn Read>>>,
    fields: Vec<Field>,
    separator: String,
}

impl Csv {
    fn parse_row(&self, idx: usize, row: &csv::StringRecord) -> Result<DogGenotype> {
        let name = self
            .fields
            .iter()
            .zip(row.iter())
            .find(|(field, _)| matches!(field, Field::Name))
            .map(|(_, value)| value.to_string())
            .unwrap_or_else(|| idx.to_string());

        let mut dog = DogGenotype::new(&name);
        for (field, value) in self.fields.iter().zip(row.iter()) {
            if let Field::Locus(locus) = field {
                let pair = self.split_pair(locus, value)?;
                if !pair.is_empty() {
                    dog.record(locus, &pair)?;
                }
            }
        }
        Ok(dog)
    }

    /// Joins an `E/e` cell into `Ee`. A cell without the separator is taken as is.
    fn split_pair(&self, locus: &Locus, value: &str) -> Result<String> {
        let cell = value.trim();
        if self.separator.is_empty() || !cell.contains(self.separator.as_str()) {
            return Ok(cell.to_string());
        }
        let parts: Vec<&str> = cell.split(self.separator.as_str()).collect();
        match parts.as_slice() {
            [first, second] if !first.is_empty() && !second.is_empty() => {
                Ok(format!("{}{}", first, second))
            }
            _ => Err(GeneticsError::MalformedCell {
                locus: locus.name().into(),
                cell: cell.into(),
            }),
        }
    }
}

impl Iterator for Csv {
    type Item = Result<DogGenotype>;

    fn next(&mut self) -> Option<Result<DogGenotype>> {
        let (idx, row) = self.records.next()?;
        let parsed = row
            .map_err(GeneticsError::from)
            .and_then(|row| self.parse_row(idx, &row))
            .map_err(|err| GeneticsError::Record {
                record: idx,
                source: Box::new(err),
            });
        Some(parsed)
    }
}

pub struct CsvBuilder {
    delimiter: u8,
    separator: String,
    name_field: Option<String>,
    meta_fields: HashSet<String>,
}

impl Default for CsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvBuilder {
    /// Construct a new Csv builder
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            separator: "/".to_owned(),
            name_field: None,
            meta_fields: HashSet::new(),
        }
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Separator written between the two alleles of a cell, if any.
    pub fn separator(&mut self, separator: &str) -> &mut Self {
        self.separator = separator.to_owned();
        self
    }

    pub fn name_field(&mut self, name_field: &str) -> &mut Self {
        self.name_field = Some(name_field.to_owned());
        self
    }

    /// Columns that are neither the name nor a locus, e.g. the test lab.
    pub fn meta_fields(&mut self, meta_fields: HashSet<String>) -> &mut Self {
        self.meta_fields = meta_fields;
        self
    }

    /// Reads headers and maps every column to a locus of `group`.
    pub fn from_reader(&self, reader: Box<dyn Read>, group: &TraitGroup) -> Result<Csv> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_reader(reader);

        let fields = rdr
            .headers()?
            .iter()
            .map(|s| {
                if self.name_field.as_deref() == Some(s) {
                    return Ok(Field::Name);
                }
                if self.meta_fields.contains(s) {
                    return Ok(Field::Meta);
                }
                group
                    .locus(s)
                    .cloned()
                    .map(Field::Locus)
                    .ok_or_else(|| GeneticsError::UnknownLocus(s.into()))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Reading genotypes for {} with {} columns",
            group.name(),
            fields.len()
        );

        Ok(Csv {
            records: rdr.into_records().enumerate(),
            fields,
            separator: self.separator.clone(),
        })
    }
}
