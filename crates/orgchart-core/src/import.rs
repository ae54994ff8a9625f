//! Assembles the nested hierarchy from flat directory records that point at their manager.

use crate::model::Employee;
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Title fragments that mark a plausible top of the organization, checked in order.
pub const EXECUTIVE_KEYWORDS: &[&str] = &[
    "chief executive",
    "ceo",
    "president",
    "chair",
    "director",
    "head",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatEmployee {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_new_employee: bool,
    #[serde(default)]
    pub manager_id: Option<String>,
}

impl FlatEmployee {
    fn to_employee(&self) -> Employee {
        Employee {
            id: self.id.clone(),
            name: self.name.clone(),
            title: self.title.clone(),
            department: non_blank(&self.department),
            email: non_blank(&self.email),
            phone: non_blank(&self.phone),
            location: non_blank(&self.location),
            is_new_employee: self.is_new_employee,
            children: Vec::new(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Explicit choice of the top-level person; the first field that matches a record wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootHint {
    pub id: Option<String>,
    pub email: Option<String>,
}

pub fn parse_records(text: &str) -> Result<Vec<FlatEmployee>> {
    Ok(serde_json::from_str(text)?)
}

/// Builds one tree out of `records`.
///
/// A record whose manager is missing or unknown is a root candidate. The root is the hinted
/// record if any, else the first candidate with an executive title, else the first
/// candidate, else the record with the most direct reports. Records that cannot be reached
/// from the chosen root are dropped with a warning, and so are repeated ids.
pub fn assemble(records: &[FlatEmployee], hint: &RootHint) -> Result<Employee> {
    if records.is_empty() {
        return Err(Error::Import {
            message: "no employee records".to_string(),
        });
    }

    let mut by_id: FxHashMap<&str, usize> = FxHashMap::default();
    for (i, r) in records.iter().enumerate() {
        if *by_id.entry(r.id.as_str()).or_insert(i) != i {
            tracing::warn!(id = %r.id, "duplicate employee id in import; keeping the first");
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut candidates: Vec<usize> = Vec::new();
    for (i, r) in records.iter().enumerate() {
        if by_id.get(r.id.as_str()) != Some(&i) {
            continue;
        }
        match r.manager_id.as_deref().and_then(|m| by_id.get(m)) {
            Some(&m) if m != i => children[m].push(i),
            _ => candidates.push(i),
        }
    }

    let root = pick_root(records, &by_id, &children, &candidates, hint);
    tracing::info!(
        root = %records[root].id,
        candidates = candidates.len(),
        "selected top-level employee"
    );

    // Pre-order walk from the root; the visited set keeps a manager cycle from looping.
    let mut visited = vec![false; records.len()];
    let mut order: Vec<usize> = Vec::with_capacity(records.len());
    let mut stack = vec![root];
    while let Some(i) = stack.pop() {
        if std::mem::replace(&mut visited[i], true) {
            continue;
        }
        order.push(i);
        stack.extend(children[i].iter().rev().filter(|c| !visited[**c]));
    }

    let dropped = by_id.len() - order.len();
    if dropped > 0 {
        tracing::warn!(dropped, "records not reachable from the top-level employee");
    }

    let mut built: Vec<Option<Employee>> = vec![None; records.len()];
    for &i in order.iter().rev() {
        let mut employee = records[i].to_employee();
        employee.children = children[i]
            .iter()
            .filter_map(|c| built[*c].take())
            .collect();
        built[i] = Some(employee);
    }
    built[root].take().ok_or_else(|| Error::Import {
        message: format!("failed to assemble hierarchy under {}", records[root].id),
    })
}

fn pick_root(
    records: &[FlatEmployee],
    by_id: &FxHashMap<&str, usize>,
    children: &[Vec<usize>],
    candidates: &[usize],
    hint: &RootHint,
) -> usize {
    if let Some(&i) = hint.id.as_deref().and_then(|id| by_id.get(id)) {
        return i;
    }
    if let Some(email) = hint.email.as_deref() {
        let hit = records.iter().position(|r| {
            r.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        });
        if let Some(i) = hit {
            return i;
        }
    }
    let executive = candidates.iter().copied().find(|&i| {
        let title = records[i].title.to_lowercase();
        EXECUTIVE_KEYWORDS.iter().any(|k| title.contains(k))
    });
    if let Some(i) = executive.or_else(|| candidates.first().copied()) {
        return i;
    }
    // Every record has a known manager, so the data is one big cycle somewhere.
    (0..records.len())
        .max_by_key(|&i| (children[i].len(), std::cmp::Reverse(i)))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, title: &str, manager: Option<&str>) -> FlatEmployee {
        FlatEmployee {
            id: id.to_string(),
            name: format!("Person {id}"),
            title: title.to_string(),
            department: None,
            email: Some(format!("{id}@example.com")),
            phone: None,
            location: None,
            is_new_employee: false,
            manager_id: manager.map(str::to_string),
        }
    }

    #[test]
    fn prefers_executive_candidate() {
        let records = vec![
            rec("x", "Contractor", None),
            rec("ceo", "Chief Executive Officer", None),
            rec("a", "Engineer", Some("ceo")),
            rec("b", "Engineer", Some("ceo")),
        ];
        let root = assemble(&records, &RootHint::default()).unwrap();
        assert_eq!(root.id, "ceo");
        let kids: Vec<&str> = root.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(kids, vec!["a", "b"]);
    }

    #[test]
    fn hint_by_email_wins() {
        let records = vec![rec("1", "CEO", None), rec("2", "VP", Some("1"))];
        let hint = RootHint {
            id: None,
            email: Some("2@EXAMPLE.com".to_string()),
        };
        let root = assemble(&records, &hint).unwrap();
        assert_eq!(root.id, "2");
        assert!(root.children.is_empty());
    }

    #[test]
    fn manager_cycle_falls_back_to_most_reports() {
        let records = vec![
            rec("a", "", Some("b")),
            rec("b", "", Some("a")),
            rec("c", "", Some("b")),
        ];
        let root = assemble(&records, &RootHint::default()).unwrap();
        assert_eq!(root.id, "b");
        let kids: Vec<&str> = root.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(kids, vec!["a", "c"]);
        assert!(root.children[0].children.is_empty());
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            assemble(&[], &RootHint::default()),
            Err(Error::Import { .. })
        ));
    }
}
