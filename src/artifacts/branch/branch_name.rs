use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::artifacts::core::GitError;
use anyhow::Context;
use derive_new::new;

const REF_PREFIX: &str = "refs/heads/";

/// A `.git`-relative reference path (`HEAD`, `refs/heads/master`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, new)]
pub struct SymRefName(String);

impl SymRefName {
    pub fn head() -> Self {
        SymRefName("HEAD".to_string())
    }

    pub fn is_head(&self) -> bool {
        self.0 == "HEAD"
    }

    pub fn as_ref_path(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SymRefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated branch name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if name.is_empty() {
            return Err(GitError::Conflict("branch name cannot be empty".to_string()).into());
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            Err(GitError::Conflict(format!("invalid branch name: {name}")).into())
        } else {
            Ok(Self(name))
        }
    }

    /// Extract the branch name from a `refs/heads/...` symbolic ref
    pub fn try_parse_sym_ref_name(sym_ref_name: &SymRefName) -> anyhow::Result<Self> {
        let path = sym_ref_name.as_ref_path();
        let name = path.strip_prefix(REF_PREFIX).ok_or_else(|| {
            GitError::Conflict(format!("ref {path} does not name a branch"))
        })?;

        Self::try_parse(name.to_string())
    }

    /// The symbolic ref pointing at this branch
    pub fn as_sym_ref_name(&self) -> SymRefName {
        SymRefName::new(format!("{REF_PREFIX}{}", self.0))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn accepts_alphanumeric_names(name in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(name).is_ok());
        }

        #[test]
        fn accepts_hierarchical_names(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{}/{}", prefix, suffix)).is_ok());
        }

        #[test]
        fn rejects_leading_dot(suffix in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!(".{}", suffix)).is_err());
        }

        #[test]
        fn rejects_lock_suffix(prefix in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!("{}.lock", prefix)).is_err());
        }

        #[test]
        fn rejects_consecutive_dots(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{}..{}", prefix, suffix)).is_err());
        }

        #[test]
        fn rejects_leading_or_trailing_slash(name in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!("/{}", name)).is_err());
            assert!(BranchName::try_parse(format!("{}/", name)).is_err());
        }

        #[test]
        fn rejects_special_characters(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+",
            special in r"[\*:\?\[\\^~]"
        ) {
            assert!(BranchName::try_parse(format!("{}{}{}", prefix, special, suffix)).is_err());
        }
    }

    #[test]
    fn rejects_empty_name() {
        assert!(BranchName::try_parse("".to_string()).is_err());
    }

    #[test]
    fn sym_ref_round_trip() {
        let branch = BranchName::try_parse("feature/login".to_string()).unwrap();
        let sym_ref = branch.as_sym_ref_name();

        assert_eq!(sym_ref.as_ref_path(), "refs/heads/feature/login");
        assert_eq!(
            BranchName::try_parse_sym_ref_name(&sym_ref).unwrap(),
            branch
        );
    }

    #[test]
    fn head_is_not_a_branch_ref() {
        assert!(BranchName::try_parse_sym_ref_name(&SymRefName::head()).is_err());
    }
}
