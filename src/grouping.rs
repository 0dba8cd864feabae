use crate::generator::sanitize_identifier;
use crate::parser::EndpointRecord;

/// Endpoints that share a first path segment and therefore one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: String,
    pub records: Vec<EndpointRecord>,
}

impl Group {
    /// File (and folder) name for this group, without extension.
    pub fn file_stem(&self) -> String {
        let stem = sanitize_identifier(&self.key);
        if stem.is_empty() {
            "root".to_string()
        } else {
            stem
        }
    }
}

pub fn group_key(relative_path: &str, lowercase: bool) -> String {
    let first = relative_path.split('/').next().unwrap_or_default();
    if lowercase {
        first.to_lowercase()
    } else {
        first.to_string()
    }
}

/// Bucket records by first segment. Groups appear in order of first use and
/// keep their records in document order.
pub fn group_records(records: Vec<EndpointRecord>, lowercase: bool) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();

    for record in records {
        let key = group_key(&record.relative_path, lowercase);
        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => group.records.push(record),
            None => groups.push(Group {
                key,
                records: vec![record],
            }),
        }
    }

    groups
}
