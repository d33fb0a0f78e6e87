//! Mapping input images onto the mirrored output tree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, PipelineError, PipelineResult};

/// Extension written when the output policy forces PNG.
const PNG_EXTENSION: &str = "png";

/// Maps paths under the input root to their destination under the output root.
#[derive(Debug, Clone)]
pub struct PathMapper {
    input_root: PathBuf,
    output_root: PathBuf,
    force_png: bool,
}

impl PathMapper {
    /// Build a mapper for a run, validating both roots.
    ///
    /// The input root must be an existing directory. The output root need not
    /// exist yet but must not be the input root. Both are stored absolute so
    /// discovered paths strip cleanly.
    pub fn new(input_root: &Path, output_root: &Path, force_png: bool) -> Result<Self, ConfigError> {
        let input_root = expand_tilde(input_root);
        let output_root = expand_tilde(output_root);

        if !input_root.exists() {
            return Err(ConfigError::InputNotFound(input_root));
        }
        if !input_root.is_dir() {
            return Err(ConfigError::InputNotADirectory(input_root));
        }

        let input_root = input_root.canonicalize()?;
        let output_root = if output_root.exists() {
            output_root.canonicalize()?
        } else {
            std::path::absolute(&output_root)?
        };

        if input_root == output_root {
            return Err(ConfigError::SameDirectory(input_root));
        }
        if output_root.starts_with(&input_root) {
            tracing::warn!(
                "Output directory {:?} is inside the input directory; \
                 a later run will pick up these outputs as inputs",
                output_root
            );
        }

        Ok(Self {
            input_root,
            output_root,
            force_png,
        })
    }

    /// Build a mapper without touching the filesystem.
    pub fn from_roots(input_root: PathBuf, output_root: PathBuf, force_png: bool) -> Self {
        Self {
            input_root,
            output_root,
            force_png,
        }
    }

    pub fn input_root(&self) -> &Path {
        &self.input_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn force_png(&self) -> bool {
        self.force_png
    }

    /// Compute the destination for an input path.
    pub fn map(&self, input: &Path) -> PipelineResult<PathBuf> {
        map_output_path(input, &self.input_root, &self.output_root, self.force_png)
    }
}

/// Which input owns each output path in one run.
///
/// With PNG forced, `photo.jpg` and `photo.png` map to the same file. The
/// first input in the order given claims it; every later one is rejected,
/// so the outcome never depends on which worker gets there first.
#[derive(Debug, Default)]
pub struct OutputClaims {
    owners: HashMap<PathBuf, PathBuf>,
    collisions: usize,
}

impl OutputClaims {
    pub fn build<'a>(mapper: &PathMapper, inputs: impl IntoIterator<Item = &'a Path>) -> Self {
        let mut claims = Self::default();
        for input in inputs {
            let Ok(output) = mapper.map(input) else {
                continue;
            };
            match claims.owners.get(&output) {
                Some(owner) => {
                    tracing::warn!("{:?} and {:?} both map to {:?}", owner, input, output);
                    claims.collisions += 1;
                }
                None => {
                    claims.owners.insert(output, input.to_path_buf());
                }
            }
        }
        claims
    }

    /// Fail unless `input` owns `output`. Unclaimed outputs are free.
    pub fn check(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        match self.owners.get(output) {
            Some(owner) if owner != input => Err(PipelineError::OutputCollision {
                path: input.to_path_buf(),
                output: output.to_path_buf(),
                owner: owner.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Inputs that lost their output to an earlier one.
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

/// Mirror `input` from `input_root` onto `output_root`, swapping the
/// extension for `.png` when `force_png` is set.
pub fn map_output_path(
    input: &Path,
    input_root: &Path,
    output_root: &Path,
    force_png: bool,
) -> PipelineResult<PathBuf> {
    let relative = input
        .strip_prefix(input_root)
        .map_err(|_| PipelineError::OutsideInputRoot {
            path: input.to_path_buf(),
            root: input_root.to_path_buf(),
        })?;

    let mut output = output_root.join(relative);
    if force_png {
        output.set_extension(PNG_EXTENSION);
    }
    Ok(output)
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}
