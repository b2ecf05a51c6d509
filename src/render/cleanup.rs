//! Text cleanup for OCR output.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static TRAILING_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").expect("valid trailing whitespace regex"));

static RUN_OF_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid whitespace regex"));

static HYPHEN_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z])-[ \t]*\n[ \t]*([a-z])").expect("valid hyphenation regex")
});

const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// NFC normalization and trailing whitespace removal
    Minimal,
    /// Minimal plus ligatures, replacement chars, whitespace runs, blank lines
    #[default]
    Standard,
    /// Standard plus hyphenation repair and private-use removal
    Aggressive,
}

impl std::str::FromStr for CleanupPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(CleanupPreset::Minimal),
            "standard" => Ok(CleanupPreset::Standard),
            "aggressive" => Ok(CleanupPreset::Aggressive),
            other => Err(format!("unknown cleanup preset: {other}")),
        }
    }
}

/// Options for text cleanup.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Strip whitespace at the end of each line
    pub trim_trailing_whitespace: bool,

    /// Fix ligatures (fi, fl, etc.)
    pub fix_ligatures: bool,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Collapse runs of spaces and tabs into one space
    pub collapse_whitespace: bool,

    /// Maximum consecutive newlines (0 = unlimited)
    pub max_consecutive_newlines: u8,

    /// Join words split by a hyphen at a line break
    pub fix_hyphenation: bool,

    /// Remove Private Use Area (PUA) characters
    pub remove_pua: bool,

    /// Leave YAML frontmatter untouched
    pub preserve_frontmatter: bool,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Aggressive => Self::aggressive(),
        }
    }

    /// Minimal cleanup options.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            trim_trailing_whitespace: true,
            fix_ligatures: false,
            remove_replacement_char: false,
            collapse_whitespace: false,
            max_consecutive_newlines: 0,
            fix_hyphenation: false,
            remove_pua: false,
            preserve_frontmatter: true,
        }
    }

    /// Standard cleanup options.
    pub fn standard() -> Self {
        Self {
            fix_ligatures: true,
            remove_replacement_char: true,
            collapse_whitespace: true,
            max_consecutive_newlines: 2,
            ..Self::minimal()
        }
    }

    /// Aggressive cleanup options.
    pub fn aggressive() -> Self {
        Self {
            fix_hyphenation: true,
            remove_pua: true,
            ..Self::standard()
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Text cleanup pipeline.
#[derive(Debug, Clone, Default)]
pub struct CleanupPipeline {
    options: CleanupOptions,
}

impl CleanupPipeline {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        Self { options }
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Process text through the cleanup pipeline.
    pub fn process(&self, text: &str) -> String {
        if self.options.preserve_frontmatter {
            if let Some((frontmatter, content)) = split_frontmatter(text) {
                return format!("{}{}", frontmatter, self.process_content(content));
            }
        }
        self.process_content(text)
    }

    /// Clean a single field value, such as a key, value or table cell.
    ///
    /// Applies character-level fixes only; line structure is left alone.
    pub fn clean_field(&self, text: &str) -> String {
        let mut result = self.normalize_chars(text);
        if self.options.collapse_whitespace {
            result = RUN_OF_SPACES.replace_all(&result, " ").into_owned();
        }
        result.trim().to_string()
    }

    fn normalize_chars(&self, text: &str) -> String {
        let mut result: String = if self.options.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        };

        if self.options.fix_ligatures {
            for (ligature, replacement) in LIGATURES {
                if result.contains(*ligature) {
                    result = result.replace(*ligature, replacement);
                }
            }
        }

        if self.options.remove_replacement_char {
            result.retain(|c| c != '\u{FFFD}');
        }

        if self.options.remove_pua {
            result.retain(|c| !is_private_use(c));
        }

        result
    }

    fn process_content(&self, text: &str) -> String {
        let mut result = self.normalize_chars(text);

        if self.options.fix_hyphenation {
            result = HYPHEN_BREAK.replace_all(&result, "$1$2").into_owned();
        }

        if self.options.collapse_whitespace {
            result = RUN_OF_SPACES.replace_all(&result, " ").into_owned();
        }

        if self.options.trim_trailing_whitespace {
            result = TRAILING_WS.replace_all(&result, "").into_owned();
        }

        if self.options.max_consecutive_newlines > 0 {
            result = limit_newlines(&result, self.options.max_consecutive_newlines as usize);
        }

        result
    }
}

fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let stripped = text.strip_prefix("---\n")?;
    let end = stripped.find("\n---\n")?;
    Some(text.split_at(4 + end + 5))
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

fn limit_newlines(text: &str, max: usize) -> String {
    let mut result = String::with_capacity(text.len());
    let mut run = 0usize;
    for c in text.chars() {
        if c == '\n' {
            run += 1;
            if run > max {
                continue;
            }
        } else {
            run = 0;
        }
        result.push(c);
    }
    result
}
