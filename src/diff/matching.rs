//! Parameter correspondence between two versions of a command.
use crate::model::ParameterDescriptor;

/// Outcome of looking up a parameter's counterpart in the other version.
#[derive(Debug, PartialEq, Eq)]
pub enum ParameterMatch<'a> {
    Unique(&'a ParameterDescriptor),
    Missing,
    /// More than one candidate corresponds; treated as unmatched.
    Ambiguous(usize),
}

impl<'a> ParameterMatch<'a> {
    pub fn unique(&self) -> Option<&'a ParameterDescriptor> {
        match self {
            ParameterMatch::Unique(param) => Some(*param),
            _ => None,
        }
    }
}

/// Two parameters correspond when the name/alias set of one is contained in
/// the other's.
pub fn corresponds(a: &ParameterDescriptor, b: &ParameterDescriptor) -> bool {
    is_subset(&a.names_and_aliases, &b.names_and_aliases)
        || is_subset(&b.names_and_aliases, &a.names_and_aliases)
}

fn is_subset(names: &[String], other: &[String]) -> bool {
    names
        .iter()
        .filter(|name| other.contains(*name))
        .count()
        == names.len()
}

/// Find the single parameter in `candidates` that corresponds to `param`.
pub fn find_match<'a>(
    param: &ParameterDescriptor,
    candidates: &'a [ParameterDescriptor],
) -> ParameterMatch<'a> {
    let mut hits = candidates.iter().filter(|other| corresponds(param, other));
    match (hits.next(), hits.count()) {
        (None, _) => ParameterMatch::Missing,
        (Some(found), 0) => ParameterMatch::Unique(found),
        (Some(_), rest) => ParameterMatch::Ambiguous(rest + 1),
    }
}

/// Find the counterpart of `param` (a member of `own`) in `other`.
///
/// The pairing must be unique from both sides: when the candidate also
/// corresponds to another member of `own`, neither side is matched.
pub fn counterpart<'a>(
    param: &ParameterDescriptor,
    own: &[ParameterDescriptor],
    other: &'a [ParameterDescriptor],
) -> ParameterMatch<'a> {
    let found = match find_match(param, other) {
        ParameterMatch::Unique(found) => found,
        unmatched => return unmatched,
    };
    match find_match(found, own) {
        ParameterMatch::Unique(back) if std::ptr::eq(back, param) => ParameterMatch::Unique(found),
        ParameterMatch::Ambiguous(count) => ParameterMatch::Ambiguous(count),
        _ => ParameterMatch::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NOT_POSITIONAL;

    fn param(name: &str, aliases: &[&str]) -> ParameterDescriptor {
        let mut names_and_aliases = vec![name.to_string()];
        names_and_aliases.extend(aliases.iter().map(|alias| alias.to_string()));
        ParameterDescriptor {
            name: name.to_string(),
            type_name: "String".to_string(),
            nullable: true,
            mandatory: false,
            position: NOT_POSITIONAL,
            from_pipeline_by_value: false,
            from_pipeline_by_property_name: false,
            from_remaining_arguments: false,
            parameter_set: None,
            names_and_aliases,
        }
    }

    #[test]
    fn identical_names_correspond() {
        let candidates = vec![param("Id", &[]), param("Name", &[])];
        let found = find_match(&param("Id", &[]), &candidates);
        assert_eq!(found.unique().map(|p| p.name.as_str()), Some("Id"));
    }

    #[test]
    fn alias_promoted_to_name_still_corresponds() {
        let old = param("Id", &["Identifier"]);
        let new = vec![param("Identifier", &[])];
        assert!(find_match(&old, &new).unique().is_some());
        assert!(find_match(&new[0], std::slice::from_ref(&old)).unique().is_some());
    }

    #[test]
    fn renamed_parameter_with_old_name_as_alias_corresponds() {
        let old = param("Bucket", &[]);
        let new = vec![param("BucketName", &["Bucket"])];
        assert!(find_match(&old, &new).unique().is_some());
    }

    #[test]
    fn disjoint_names_do_not_correspond() {
        let candidates = vec![param("Key", &["K"])];
        assert_eq!(find_match(&param("Id", &[]), &candidates), ParameterMatch::Missing);
    }

    #[test]
    fn several_candidates_are_ambiguous() {
        let candidates = vec![param("Name", &["Id"]), param("Key", &["Id"])];
        let found = find_match(&param("Id", &[]), &candidates);
        assert_eq!(found, ParameterMatch::Ambiguous(2));
        assert!(found.unique().is_none());
    }

    #[test]
    fn contested_counterpart_is_unmatched_from_both_sides() {
        let old = vec![param("Id", &[])];
        let new = vec![param("Name", &["Id"]), param("Key", &["Id"])];
        assert_eq!(counterpart(&old[0], &old, &new), ParameterMatch::Ambiguous(2));
        assert_eq!(counterpart(&new[1], &new, &old), ParameterMatch::Ambiguous(2));
        assert!(counterpart(&new[0], &new, &old).unique().is_none());
    }

    #[test]
    fn mutual_counterparts_pair_up() {
        let old = vec![param("Id", &["Identifier"]), param("Name", &[])];
        let new = vec![param("Identifier", &[]), param("Name", &[])];
        let found = counterpart(&old[0], &old, &new).unique().expect("paired");
        assert_eq!(found.name, "Identifier");
        let back = counterpart(&new[0], &new, &old).unique().expect("paired");
        assert_eq!(back.name, "Id");
    }
}
