//! Synthetic corpus generation.
//!
//! Builds source trees with known content and returns the exact set of
//! relative paths an archive of that tree must contain. Paths in the
//! expected set always use the canonical `/` separator and directories
//! carry a trailing `/`, whatever the host convention is.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::CorpusError;

/// Name of the single-file sample and of the tree corpus root.
pub const SAMPLE_NAME: &str = "testsample";

/// Alphabet the unique-name generator permutes.
const NAME_SYMBOLS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of generated directory and file names.
const NAME_LEN: usize = 12;

/// The fixed sample payload: the ASCII letters repeated ten times over,
/// 520 bytes. Repetitive on purpose, so any real compressor shrinks it.
pub fn sample_payload() -> Vec<u8> {
    NAME_SYMBOLS.as_bytes().repeat(10)
}

/// Lay out a corpus of exactly one file, `testsample`, under `root`.
///
/// Returns the expected relative-path set (a single name).
pub fn single_file_corpus(root: &Path) -> Result<BTreeSet<String>, CorpusError> {
    fs::write(root.join(SAMPLE_NAME), sample_payload())?;
    Ok(BTreeSet::from([SAMPLE_NAME.to_owned()]))
}

/// Lay out a directory-tree corpus under `root` and return the expected
/// relative-path set.
///
/// Starting from a single `testsample/` directory, each of `levels` rounds
/// takes a snapshot of every directory in the tree and gives each one a
/// new subdirectory plus `files_per_dir` sample files, all with unique
/// generated names. With the defaults (3 rounds, 2 files) that is 8
/// directories and 14 files.
///
/// # Errors
///
/// [`CorpusError::NamesExhausted`] if the tree is sized past what the
/// fixed-length permutation namespace can supply.
pub fn tree_corpus(
    root: &Path,
    levels: usize,
    files_per_dir: usize,
) -> Result<BTreeSet<String>, CorpusError> {
    let mut names = NameGenerator::new();
    let mut expected = BTreeSet::new();

    let tree_root = root.join(SAMPLE_NAME);
    fs::create_dir(&tree_root)?;
    expected.insert(format!("{SAMPLE_NAME}/"));

    for _ in 0..levels {
        // Snapshot the directories first: the ones created in this round
        // must not receive children until the next round.
        let dirs: Vec<_> = WalkDir::new(&tree_root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.path().to_path_buf())
            .collect();

        for dir in dirs {
            let sub = dir.join(names.next_name(&expected)?);
            fs::create_dir(&sub)?;
            expected.insert(format!("{}/", relative_name(root, &sub)));

            for _ in 0..files_per_dir {
                let file = dir.join(names.next_name(&expected)?);
                fs::write(&file, sample_payload())?;
                expected.insert(relative_name(root, &file));
            }
        }
    }

    Ok(expected)
}

/// Canonical-separator relative path of `path` under `root`.
fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    parts.join("/")
}

/// Successive fixed-length permutations of [`NAME_SYMBOLS`].
///
/// Mirrors lexicographic k-permutation order; the namespace is finite and
/// running it dry is an error rather than a silent reuse.
struct NameGenerator {
    pool: Vec<u8>,
    indices: Vec<usize>,
    cycles: Vec<usize>,
    started: bool,
    exhausted: bool,
    generated: usize,
}

impl NameGenerator {
    fn new() -> Self {
        let pool: Vec<u8> = NAME_SYMBOLS.bytes().collect();
        let n = pool.len();
        NameGenerator {
            indices: (0..n).collect(),
            cycles: (0..NAME_LEN).map(|i| n - i).collect(),
            pool,
            started: false,
            exhausted: false,
            generated: 0,
        }
    }

    /// The next unique name. `taken` guards against the (theoretical)
    /// case of a generated name colliding with something already in the
    /// expected set.
    fn next_name(&mut self, taken: &BTreeSet<String>) -> Result<String, CorpusError> {
        loop {
            let name = self.advance()?;
            if !taken.contains(&name) {
                return Ok(name);
            }
        }
    }

    fn advance(&mut self) -> Result<String, CorpusError> {
        if self.exhausted {
            return Err(CorpusError::NamesExhausted {
                generated: self.generated,
            });
        }

        if !self.started {
            self.started = true;
            self.generated += 1;
            return Ok(self.current());
        }

        let n = self.pool.len();
        for i in (0..NAME_LEN).rev() {
            self.cycles[i] -= 1;
            if self.cycles[i] == 0 {
                // Rotate indices[i..] left by one and reset the cycle
                self.indices[i..].rotate_left(1);
                self.cycles[i] = n - i;
            } else {
                let j = n - self.cycles[i];
                self.indices.swap(i, j);
                self.generated += 1;
                return Ok(self.current());
            }
        }

        self.exhausted = true;
        Err(CorpusError::NamesExhausted {
            generated: self.generated,
        })
    }

    fn current(&self) -> String {
        self.indices[..NAME_LEN]
            .iter()
            .map(|&i| self.pool[i] as char)
            .collect()
    }
}
