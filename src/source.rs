// Memory-mapped file source
//
// Convenience collaborator for callers that tokenize whole files: maps the
// file read-only and hands the bytes to Tokenizer::set_source. The mapping
// (and on Windows the mapping handle, which memmap2 manages) is released on
// drop.

use std::fs::File;
use std::io;
use std::path::Path;

use memmap2::Mmap;

/// Read-only memory mapping of a file, usable as a tokenizer source.
#[derive(Debug)]
pub struct SourceMap {
    // Zero-length files cannot be mapped; they are represented as None and
    // read back as an empty slice.
    map: Option<Mmap>,
}

impl SourceMap {
    /// Open `path` and map its contents read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<SourceMap> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(SourceMap { map: None });
        }
        // Safety: the mapping is read-only and private to this value; the
        // file must not be truncated by another process while it is alive.
        let map = unsafe { Mmap::map(&file)? };
        Ok(SourceMap { map: Some(map) })
    }

    /// The mapped bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_maps_file_contents() {
        let mut path = std::env::temp_dir();
        path.push("coltok_sourcemap_test.csv");
        {
            let mut f = File::create(&path).unwrap();
            f.write_all(b"1,2,3\n").unwrap();
        }
        let map = SourceMap::open(&path).unwrap();
        assert_eq!(map.as_bytes(), b"1,2,3\n");
        assert_eq!(map.len(), 6);
        drop(map);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_empty_file_maps_to_empty_slice() {
        let mut path = std::env::temp_dir();
        path.push("coltok_sourcemap_empty.csv");
        File::create(&path).unwrap();
        let map = SourceMap::open(&path).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.as_bytes(), b"");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(SourceMap::open("/no/such/coltok/file.csv").is_err());
    }
}
