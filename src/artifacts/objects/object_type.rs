use crate::artifacts::core::GitError;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Parse the `<type> <size>\0` frame prefix, returning the type and the
    /// advertised payload size.
    pub fn parse_header(reader: &mut impl BufRead) -> anyhow::Result<(ObjectType, usize)> {
        let mut type_bytes = Vec::new();
        reader.read_until(b' ', &mut type_bytes)?;
        if type_bytes.pop() != Some(b' ') {
            return Err(GitError::Corrupt("object header: missing type".to_string()).into());
        }

        let object_type = std::str::from_utf8(&type_bytes)
            .map_err(|_| GitError::Corrupt("object header: non-utf8 type".to_string()))?;
        let object_type = ObjectType::try_from(object_type)?;

        let mut size_bytes = Vec::new();
        reader.read_until(b'\0', &mut size_bytes)?;
        if size_bytes.pop() != Some(b'\0') {
            return Err(GitError::Corrupt("object header: missing size".to_string()).into());
        }

        let size = std::str::from_utf8(&size_bytes)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| GitError::Corrupt("object header: invalid size".to_string()))?;

        Ok((object_type, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            other => Err(GitError::Unsupported(format!("object type {other:?}")).into()),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn parses_header_and_leaves_payload() {
        let mut reader = Cursor::new(b"blob 11\0hello world".to_vec());
        let (object_type, size) = ObjectType::parse_header(&mut reader).unwrap();

        assert_eq!(object_type, ObjectType::Blob);
        assert_eq!(size, 11);

        let mut rest = Vec::new();
        std::io::Read::read_to_end(&mut reader, &mut rest).unwrap();
        assert_eq!(rest, b"hello world");
    }

    #[test]
    fn rejects_unknown_type() {
        let mut reader = Cursor::new(b"tag 3\0xyz".to_vec());
        assert!(ObjectType::parse_header(&mut reader).is_err());
    }

    #[test]
    fn rejects_missing_size() {
        let mut reader = Cursor::new(b"blob eleven\0hello world".to_vec());
        assert!(ObjectType::parse_header(&mut reader).is_err());
    }
}
