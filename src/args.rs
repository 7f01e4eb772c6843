//! Argument groups
//!
//! A single command line carries arguments for three downstream programs.
//! Sentinel tokens open a group; everything up to the next sentinel (or the
//! end of input) belongs to it. Tokens before the first sentinel are the
//! front end's own flags.

/// The downstream stage an argument group feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Setup,
    Compile,
    Run,
}

/// The three reserved tokens that open a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinels {
    pub setup: String,
    pub compile: String,
    pub run: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Sentinels {
            setup: "-Ab".to_string(),
            compile: "-Ac".to_string(),
            run: "-Ae".to_string(),
        }
    }
}

impl Sentinels {
    /// Returns the group `token` opens, if it is a sentinel.
    pub fn group_of(&self, token: &str) -> Option<Group> {
        if token == self.setup {
            Some(Group::Setup)
        } else if token == self.compile {
            Some(Group::Compile)
        } else if token == self.run {
            Some(Group::Run)
        } else {
            None
        }
    }
}

/// One classified command-line token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Seen before any sentinel.
    Default(&'a str),
    /// A sentinel; consumed, never forwarded.
    GroupMarker(Group),
    /// Seen after a sentinel; belongs to the most recent one.
    Arg(&'a str),
}

/// Classifies every raw token. Pure; the only context a token needs is
/// whether some sentinel came before it.
pub fn tokenize<'a>(raw: &'a [String], sentinels: &Sentinels) -> Vec<Token<'a>> {
    let first_marker = raw
        .iter()
        .position(|token| sentinels.group_of(token).is_some())
        .unwrap_or(raw.len());

    raw.iter()
        .enumerate()
        .map(|(index, token)| match sentinels.group_of(token) {
            Some(group) => Token::GroupMarker(group),
            None if index < first_marker => Token::Default(token),
            None => Token::Arg(token),
        })
        .collect()
}

/// Arguments partitioned by destination. Built once and read verbatim by
/// the stage that owns each group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentGroups {
    pub default: Vec<String>,
    pub setup: Vec<String>,
    pub compile: Vec<String>,
    pub run: Vec<String>,
}

impl ArgumentGroups {
    /// Splits a raw argument vector (program name excluded) into groups.
    pub fn route(raw: &[String], sentinels: &Sentinels) -> ArgumentGroups {
        let mut groups = ArgumentGroups::default();
        let mut active = Group::Setup;
        for token in tokenize(raw, sentinels) {
            match token {
                Token::Default(text) => groups.default.push(text.to_string()),
                Token::GroupMarker(group) => active = group,
                Token::Arg(text) => groups.bucket_mut(active).push(text.to_string()),
            }
        }
        groups
    }

    pub fn get(&self, group: Group) -> &[String] {
        match group {
            Group::Setup => &self.setup,
            Group::Compile => &self.compile,
            Group::Run => &self.run,
        }
    }

    fn bucket_mut(&mut self, group: Group) -> &mut Vec<String> {
        match group {
            Group::Setup => &mut self.setup,
            Group::Compile => &mut self.compile,
            Group::Run => &mut self.run,
        }
    }
}
