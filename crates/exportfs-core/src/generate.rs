//! Random exports file generation for benchmarking and testing.
//!
//! Builds the expected [`ExportTable`] alongside the text, so generated
//! files can be checked against what the parser produces. The text uses
//! every construct the parser understands: comments, quoted paths, `-opts`
//! defaults and backslash continuations.

use crate::parse::{Export, ExportOption, ExportTable, render_path};
use rand::prelude::*;
use rand::rngs::StdRng;

/// Configuration for generating exports files.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of export lines to generate.
    pub num_lines: usize,
    /// Number of comment lines to generate.
    pub num_comments: usize,
    /// Maximum hosts per line (1-4 typical).
    pub max_hosts_per_line: usize,
    /// Seed for deterministic generation.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_lines: 100,
            num_comments: 20,
            max_hosts_per_line: 4,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    /// Create a new config with specified lines and proportional comments.
    ///
    /// Comments are set to ~20% of lines.
    pub fn new(num_lines: usize) -> Self {
        Self {
            num_lines,
            num_comments: num_lines / 5,
            ..Default::default()
        }
    }

    /// Small fixture (~10 lines).
    pub fn small() -> Self {
        Self::new(10)
    }

    /// Medium fixture (~100 lines).
    pub fn medium() -> Self {
        Self::new(100)
    }

    /// Large fixture (~1000 lines).
    pub fn large() -> Self {
        Self::new(1_000)
    }

    /// Extra large fixture (~10k lines).
    pub fn xlarge() -> Self {
        Self::new(10_000)
    }

    /// Generate a file targeting approximately the given byte size.
    ///
    /// Note: Actual size varies with host and option counts.
    pub fn target_bytes(bytes: usize) -> Self {
        // Average line is ~70 bytes
        Self::new(bytes.saturating_div(70).max(1))
    }

    /// Set the random seed for deterministic generation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Vocabulary for generating realistic paths, hosts and options.
mod vocabulary {
    pub const PATH_TEMPLATES: &[&str] = &[
        "/srv/{name}",
        "/export/{name}",
        "/home/{user}",
        "/var/{name}",
        "/srv/{name} share",
        "/",
    ];

    pub const NAMES: &[&str] = &["www", "projects", "log", "build", "pub", "data", "backup"];
    pub const USERS: &[&str] = &["alice", "bob", "drake", "dumb user"];
    pub const HOSTS: &[&str] = &[
        "master",
        "trusty",
        "*",
        "*.local.domain",
        "proj*.local.domain",
        "@trusted",
        "@external",
        "192.0.2.0/24",
        "2001:db8:9:e54::/64",
        "buildhost[0-9].local.domain",
    ];

    /// Option keys are unique so generated defaults survive merging.
    pub const OPTIONS: &[(&str, &str)] = &[
        ("rw", ""),
        ("ro", ""),
        ("sync", ""),
        ("no_root_squash", ""),
        ("all_squash", ""),
        ("insecure", ""),
        ("no_subtree_check", ""),
        ("anonuid", "150"),
        ("anongid", "100"),
        ("sec", "krb5p"),
        ("mp", "/www/pub"),
    ];

    pub const SECTION_NAMES: &[&str] = &["Workstations", "Build farm", "Public", "Backups"];
}

/// Probability of inserting a comment section header (percentage).
const COMMENT_PROBABILITY: u32 = 20;

/// Probability that a line declares `-opts` defaults (percentage).
const DEFAULTS_PROBABILITY: u32 = 25;

/// Probability that a line is split with continuations (percentage).
const CONTINUATION_PROBABILITY: u32 = 15;

/// Probability of a trailing comment on an export line (percentage).
const TRAILING_COMMENT_PROBABILITY: u32 = 10;

/// One generated item of the file.
enum Item {
    Blank,
    Comment(String),
    Entry {
        exports: Vec<Export>,
        defaults: Option<Vec<ExportOption>>,
        continued: bool,
        trailing_comment: bool,
    },
}

/// Generates the items of a file based on configuration.
fn generate_items(config: &GeneratorConfig) -> Vec<Item> {
    use vocabulary::*;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut items = Vec::with_capacity(config.num_lines + config.num_comments * 2 + 2);

    items.push(Item::Comment(
        " Auto-generated exports for benchmarking".to_string(),
    ));
    items.push(Item::Blank);

    let mut comments_added = 0;

    for lines_added in 0..config.num_lines {
        // Maybe add a section comment
        if comments_added < config.num_comments
            && lines_added > 0
            && rng.random_ratio(COMMENT_PROBABILITY, 100)
        {
            let section = SECTION_NAMES[rng.random_range(0..SECTION_NAMES.len())];
            items.push(Item::Blank);
            items.push(Item::Comment(format!(" {} section", section)));
            comments_added += 1;
        }

        let template = PATH_TEMPLATES[rng.random_range(0..PATH_TEMPLATES.len())];
        let name = NAMES[rng.random_range(0..NAMES.len())];
        let user = USERS[rng.random_range(0..USERS.len())];
        let path = template.replace("{name}", name).replace("{user}", user);

        let defaults = rng
            .random_ratio(DEFAULTS_PROBABILITY, 100)
            .then(|| generate_options(&mut rng));

        let num_hosts = rng.random_range(1..=config.max_hosts_per_line);
        let exports = (0..num_hosts)
            .map(|_| {
                let machine = HOSTS[rng.random_range(0..HOSTS.len())];
                let options = match &defaults {
                    Some(defaults) if rng.random_bool(0.5) => defaults.clone(),
                    _ => generate_options(&mut rng),
                };
                Export::new(path.clone(), machine, options)
            })
            .collect();

        items.push(Item::Entry {
            exports,
            defaults,
            continued: num_hosts > 1 && rng.random_ratio(CONTINUATION_PROBABILITY, 100),
            trailing_comment: rng.random_ratio(TRAILING_COMMENT_PROBABILITY, 100),
        });
    }

    items
}

/// Generate a non-empty option list with distinct keys.
fn generate_options(rng: &mut StdRng) -> Vec<ExportOption> {
    let count = rng.random_range(1..=3);
    vocabulary::OPTIONS
        .choose_multiple(rng, count)
        .map(|(key, value)| ExportOption::new(*key, *value))
        .collect()
}

/// Renders one export line.
///
/// Hosts whose options equal the line defaults are written bare so the
/// parser has to fill them in.
fn render_entry(
    out: &mut String,
    exports: &[Export],
    defaults: Option<&[ExportOption]>,
    continued: bool,
) {
    let Some(first) = exports.first() else {
        return;
    };
    out.push_str(&render_path(&first.path));

    if let Some(defaults) = defaults {
        let list: Vec<String> = defaults.iter().map(ToString::to_string).collect();
        out.push_str(" -");
        out.push_str(&list.join(","));
    }

    for (i, export) in exports.iter().enumerate() {
        if continued && i > 0 {
            out.push_str(" \\\n    ");
        } else {
            out.push(' ');
        }
        if defaults == Some(export.options.as_slice()) {
            out.push_str(&export.machine);
        } else {
            out.push_str(&export.host_literal());
        }
    }
}

/// Generates the table a parser should produce for the generated file.
pub fn generate_table(config: &GeneratorConfig) -> ExportTable {
    generate_items(config)
        .into_iter()
        .filter_map(|item| match item {
            Item::Entry { exports, .. } => Some(exports),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Generates an exports file as a string.
pub fn generate(config: &GeneratorConfig) -> String {
    let mut out = String::new();
    for item in generate_items(config) {
        match item {
            Item::Blank => {}
            Item::Comment(text) => {
                out.push('#');
                out.push_str(&text);
            }
            Item::Entry {
                exports,
                defaults,
                continued,
                trailing_comment,
            } => {
                render_entry(&mut out, &exports, defaults.as_deref(), continued);
                if trailing_comment {
                    out.push_str("  # generated");
                }
            }
        }
        out.push('\n');
    }
    out
}
