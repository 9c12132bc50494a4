//! Identical-processing sets (§4.6 last paragraph).
//!
//! Groups files by filename with a single regex capture group blanked out
//! to `*`; within a group, the file whose capture matches the supplied
//! "authority" string determines the correction, which every other member
//! of the group must then replay verbatim. Grounded on the original
//! `IdenticalProcessingSet::ProcessSets`/`AllHaveSameNumFrames` pairing:
//! grouping by filename pattern, then a same-frame-count gate before the
//! shared transformation is allowed to proceed.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{Error, Result};

/// One sample-set: every file whose filename matches the same blanked
/// pattern, plus (if found) which member is the authority.
#[derive(Debug, Clone)]
pub struct Group {
    pub key: String,
    pub members: Vec<usize>,
    pub authority: Option<usize>,
}

/// Group `filenames` (index-aligned with the caller's file collection) by
/// `pattern` with its one capture group blanked to `*`, then identify each
/// group's authority member by comparing the captured text to
/// `authority_value`.
pub fn group_files(filenames: &[String], pattern: &Regex, authority_value: &str) -> Result<Vec<Group>> {
    if pattern.captures_len() != 2 {
        return Err(Error::BadGroupingPattern);
    }

    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, name) in filenames.iter().enumerate() {
        let key = blank_capture(name, pattern);
        if !by_key.contains_key(&key) {
            order.push(key.clone());
        }
        by_key.entry(key).or_default().push(i);
    }

    let groups = order
        .into_iter()
        .map(|key| {
            let members = by_key.remove(&key).unwrap_or_default();
            let authority = members.iter().copied().find(|&i| {
                pattern
                    .captures(&filenames[i])
                    .and_then(|c| c.get(1))
                    .is_some_and(|m| m.as_str() == authority_value)
            });
            Group { key, members, authority }
        })
        .collect();

    Ok(groups)
}

fn blank_capture(name: &str, pattern: &Regex) -> String {
    match pattern.captures(name).and_then(|c| c.get(1)) {
        Some(m) => format!("{}*{}", &name[..m.start()], &name[m.end()..]),
        None => name.to_string(),
    }
}

/// Abort the group with an error unless every member has the same frame
/// count as the first (§4.6: "requires equal frame count across the
/// group; otherwise abort the group with an error").
pub fn verify_equal_frame_counts(group: &Group, frame_count_of: impl Fn(usize) -> usize) -> Result<()> {
    let Some(&first) = group.members.first() else {
        return Ok(());
    };
    let expected = frame_count_of(first);
    for &idx in &group.members[1..] {
        let found = frame_count_of(idx);
        if found != expected {
            return Err(Error::GroupFrameCountMismatch {
                group: group.key.clone(),
                expected,
                found,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_blanked_capture() {
        let names = vec![
            "sample-C2-close".to_string(),
            "sample-C2-room".to_string(),
            "sample-D2-close".to_string(),
            "sample-D2-room".to_string(),
        ];
        let pattern = Regex::new(".*-(close|room).*").unwrap();
        let groups = group_files(&names, &pattern, "close").unwrap();
        assert_eq!(groups.len(), 2);
        for g in &groups {
            assert_eq!(g.members.len(), 2);
            assert!(g.authority.is_some());
        }
    }

    #[test]
    fn missing_authority_yields_none() {
        let names = vec!["a-close".to_string(), "a-room".to_string()];
        let pattern = Regex::new("a-(close|room)").unwrap();
        let groups = group_files(&names, &pattern, "ambient").unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].authority.is_none());
    }

    #[test]
    fn rejects_pattern_without_exactly_one_group() {
        let names = vec!["a".to_string()];
        let pattern = Regex::new("a").unwrap();
        assert!(group_files(&names, &pattern, "x").is_err());
    }

    #[test]
    fn frame_count_mismatch_aborts_group() {
        let names = vec!["a-close".to_string(), "a-room".to_string()];
        let pattern = Regex::new("a-(close|room)").unwrap();
        let groups = group_files(&names, &pattern, "close").unwrap();
        let counts = [100usize, 200usize];
        let result = verify_equal_frame_counts(&groups[0], |i| counts[i]);
        assert!(result.is_err());
    }

    #[test]
    fn matching_frame_counts_pass() {
        let names = vec!["a-close".to_string(), "a-room".to_string()];
        let pattern = Regex::new("a-(close|room)").unwrap();
        let groups = group_files(&names, &pattern, "close").unwrap();
        let counts = [100usize, 100usize];
        assert!(verify_equal_frame_counts(&groups[0], |i| counts[i]).is_ok());
    }
}
