//! Dispatch conversion.
//!
//! Turns the accumulated artifact into one `switch` over a uniformly random index,
//! one arm per fragment in file order, plus a fatal default arm:
//!
//! ```text
//! switch (rnd::number<std::size_t>(0, 1)) {
//!     // ((x << 16) & 6) == 0
//!     case 0: {
//!         as->shl(x, zasm::Imm(16));
//!         as->and_(x, zasm::Imm(6));
//!         as->cmp(x, zasm::Imm(0));
//!         var_alloc.pop(as);
//!         as->jz(successor_label);
//!         as->jmp(dead_branch_label);
//!         break;
//!     }
//!     ...
//!     default:
//!         throw std::runtime_error("gen_predicate: invalid random index");
//! };
//! ```

use crate::fragment::{Fragment, parse_artifact};
use crate::result::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Target-language details of the emitted dispatch block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Random index expression; `{max}` is replaced with `F - 1`.
    pub selector: String,
    /// Line prefix identifying compare instructions.
    pub compare_prefix: String,
    /// Inserted after every compare line; `None` disables insertion.
    pub cleanup: Option<String>,
    /// Body of the default arm.
    pub fatal: String,
    /// Textual `(from, to)` replacements applied to instruction lines.
    pub renames: Vec<(String, String)>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            selector: "rnd::number<std::size_t>(0, {max})".to_string(),
            compare_prefix: "as->cmp".to_string(),
            cleanup: Some("var_alloc.pop(as);".to_string()),
            fatal: r#"throw std::runtime_error("gen_predicate: invalid random index");"#
                .to_string(),
            // `xor` is reserved by the target assembler API
            renames: vec![("as->xor(".to_string(), "as->xor_(".to_string())],
        }
    }
}

/// One `case` of the dispatch block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchArm {
    pub index: usize,
    /// Comment line printed above the `case`.
    pub guard: String,
    /// Normalized instruction lines without trailing `;`.
    pub instructions: Vec<String>,
}

/// Arms `0..F-1` in artifact order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchBlock {
    pub arms: Vec<DispatchArm>,
}

impl DispatchBlock {
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Recovers arms from rendered dispatch text, dropping wrapper syntax, trailing
    /// `;` and inserted cleanup lines.
    pub fn parse(text: &str, config: &ConverterConfig) -> Result<Self> {
        let cleanup = config.cleanup.as_deref().map(str::trim);
        let mut arms: Vec<DispatchArm> = Vec::new();
        let mut pending_guard: Option<String> = None;
        let mut open: Option<DispatchArm> = None;

        for (n, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let malformed = |msg: &str| Error::MalformedDispatch {
                line: n + 1,
                msg: msg.to_string(),
            };

            if let Some(arm) = open.as_mut() {
                match line {
                    "break;" => {}
                    "}" => {
                        if let Some(arm) = open.take() {
                            arms.push(arm);
                        }
                    }
                    _ if Some(line) == cleanup => {}
                    "" => return Err(malformed("blank line inside arm")),
                    _ => arm
                        .instructions
                        .push(line.strip_suffix(';').unwrap_or(line).to_string()),
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix("case ") {
                let index = rest
                    .strip_suffix(": {")
                    .and_then(|i| i.trim().parse::<usize>().ok())
                    .ok_or_else(|| malformed("unparseable case label"))?;
                if index != arms.len() {
                    return Err(malformed("arm indices are not contiguous"));
                }
                open = Some(DispatchArm {
                    index,
                    guard: pending_guard.take().unwrap_or_default(),
                    instructions: Vec::new(),
                });
            } else if line == "default:" {
                break;
            } else if line.starts_with("switch") || line.is_empty() {
                continue;
            } else {
                pending_guard = Some(line.to_string());
            }
        }

        if open.is_some() {
            return Err(Error::MalformedDispatch {
                line: text.lines().count(),
                msg: "unterminated arm".to_string(),
            });
        }
        Ok(Self { arms })
    }
}

/// Converts fragments into a dispatch block and renders it.
#[derive(Debug, Clone, Default)]
pub struct DispatchConverter {
    config: ConverterConfig,
}

impl DispatchConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Partitions artifact text and builds the block.
    pub fn convert_text(&self, artifact: &str) -> Result<DispatchBlock> {
        self.convert(&parse_artifact(artifact))
    }

    /// Builds one arm per fragment, numbered in order.
    pub fn convert(&self, fragments: &[Fragment]) -> Result<DispatchBlock> {
        if fragments.is_empty() {
            return Err(Error::EmptyArtifact);
        }
        let arms = fragments
            .iter()
            .enumerate()
            .map(|(index, fragment)| DispatchArm {
                index,
                guard: fragment.guard.clone(),
                instructions: fragment.body.iter().map(|l| self.normalize(l)).collect(),
            })
            .collect::<Vec<_>>();
        debug!("Converted {} fragments into dispatch arms", arms.len());
        Ok(DispatchBlock { arms })
    }

    /// Renders the block as target source text.
    pub fn render(&self, block: &DispatchBlock) -> Result<String> {
        if block.is_empty() {
            return Err(Error::EmptyArtifact);
        }
        let selector = self
            .config
            .selector
            .replace("{max}", &(block.len() - 1).to_string());
        let mut out = format!("switch ({selector}) {{\n");

        for (i, arm) in block.arms.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            if !arm.guard.is_empty() {
                out.push_str(&format!("\t{}\n", arm.guard));
            }
            out.push_str(&format!("\tcase {}: {{\n", arm.index));
            for line in &arm.instructions {
                out.push_str(&format!("\t\t{line};\n"));
                if let Some(cleanup) = &self.config.cleanup
                    && line.starts_with(&self.config.compare_prefix)
                {
                    out.push_str(&format!("\t\t{cleanup}\n"));
                }
            }
            out.push_str("\t\tbreak;\n\t}\n");
        }

        out.push_str(&format!("\n\tdefault:\n\t\t{}\n}};\n", self.config.fatal));
        Ok(out)
    }

    /// `convert_text` followed by `render`.
    pub fn convert_and_render(&self, artifact: &str) -> Result<String> {
        self.render(&self.convert_text(artifact)?)
    }

    fn normalize(&self, line: &str) -> String {
        let line = line.trim();
        let mut line = line.strip_suffix(';').unwrap_or(line).to_string();
        for (from, to) in &self.config.renames {
            line = line.replace(from.as_str(), to);
        }
        line
    }
}
