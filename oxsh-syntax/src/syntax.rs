// This file is part of oxsh, a POSIX command interpreter.
// Copyright (C) 2024 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Shell command language syntax
//!
//! This module contains types that represent abstract syntax trees (ASTs) of
//! the shell language.
//!
//! ## Syntactic elements
//!
//! The AST type that represents a whole source program is [`List`], which is
//! a vector of [`Item`]s. An `Item` is a possibly asynchronous [`AndOrList`],
//! which is a sequence of conditionally executed [`Pipeline`]s. A `Pipeline`
//! is a sequence of [`Command`]s separated by `|`.
//!
//! There are three types of `Command`s: [`SimpleCommand`],
//! [`FullCompoundCommand`], and [`FunctionDefinition`], where
//! [`CompoundCommand`] comes in many variants.
//!
//! ## Lexical elements
//!
//! Tokens that make up commands may contain quotations and expansions. A
//! [`Word`], a sequence of [`WordUnit`]s, represents such a token. Within
//! double-quotes, tilde expansion and quotations are not recognized while
//! other kinds of expansions are; such part is represented as [`Text`], a
//! sequence of [`TextUnit`]s.
//!
//! The unit sequence of a word records the quoting context each part came
//! from, which the expansion stage relies on: field splitting applies only to
//! text expanded outside quotes, and pathname expansion only to unquoted
//! characters.
//!
//! ## Displaying
//!
//! Most AST types support the [`Display`](std::fmt::Display) trait, which
//! allows converting an AST back to source code form. The `Display`
//! implementations always produce single-line source code with
//! here-document contents omitted.

use crate::lex::Operator;
use crate::source::Location;
use std::cell::OnceCell;
use std::fmt;
use std::fmt::Write as _;
use std::rc::Rc;

/// File descriptor number
///
/// This is the `newtype` pattern applied to `i32`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub i32);

impl Fd {
    /// File descriptor for the standard input
    pub const STDIN: Fd = Fd(0);
    /// File descriptor for the standard output
    pub const STDOUT: Fd = Fd(1);
    /// File descriptor for the standard error
    pub const STDERR: Fd = Fd(2);
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Special parameter
///
/// Each special parameter is a single character that has a special meaning
/// in the shell language. For example, `@` represents all positional
/// parameters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SpecialParam {
    /// `@` (all positional parameters)
    At,
    /// `*` (all positional parameters)
    Asterisk,
    /// `#` (number of positional parameters)
    Number,
    /// `?` (exit status of the last command)
    Question,
    /// `-` (active shell options)
    Hyphen,
    /// `$` (process ID of the shell)
    Dollar,
    /// `!` (process ID of the last asynchronous command)
    Exclamation,
    /// `0` (name of the shell or shell script)
    Zero,
}

impl SpecialParam {
    /// Returns the special parameter for the given character, if any.
    #[must_use]
    pub fn from_char(c: char) -> Option<SpecialParam> {
        use SpecialParam::*;
        match c {
            '@' => Some(At),
            '*' => Some(Asterisk),
            '#' => Some(Number),
            '?' => Some(Question),
            '-' => Some(Hyphen),
            '$' => Some(Dollar),
            '!' => Some(Exclamation),
            '0' => Some(Zero),
            _ => None,
        }
    }
}

/// Type of a parameter
///
/// This enum distinguishes three types of [parameters](Param): named,
/// special, and positional. The actual parameter name is stored separately
/// as a string; this value is precomputed from the name so the expansion
/// stage does not have to re-examine it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParamType {
    /// Named parameter (a variable)
    Variable,
    /// Special parameter
    Special(SpecialParam),
    /// Positional parameter
    ///
    /// Positional parameters are indexed starting from 1. An index too large
    /// to fit in a `usize` becomes `usize::MAX`, which is guaranteed to
    /// name a non-existent parameter since a `Vec` cannot have that many
    /// elements.
    Positional(usize),
}

/// Parameter that appears in a parameter expansion
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Param {
    /// Literal representation of the parameter name
    ///
    /// Examples include `foo`, `@`, `#`, `0`, and `12`.
    pub id: String,

    /// Type of the parameter, precomputed from `id`
    pub r#type: ParamType,
}

impl Param {
    /// Classifies a parameter name and constructs a `Param`.
    ///
    /// A name of all decimal digits is a positional parameter unless it is
    /// the single digit `0`, which is special. A single special character
    /// yields the corresponding special parameter. Anything else is a
    /// variable name.
    #[must_use]
    pub fn from_id<S: Into<String>>(id: S) -> Param {
        fn inner(id: String) -> Param {
            let r#type = if id == "0" {
                ParamType::Special(SpecialParam::Zero)
            } else if id.bytes().all(|b| b.is_ascii_digit()) && !id.is_empty() {
                ParamType::Positional(id.parse().unwrap_or(usize::MAX))
            } else {
                let mut chars = id.chars();
                match (chars.next().and_then(SpecialParam::from_char), chars.next()) {
                    (Some(special), None) => ParamType::Special(special),
                    _ => ParamType::Variable,
                }
            };
            Param { id, r#type }
        }
        inner(id.into())
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}

/// Flag that specifies how the value is substituted in a [switch](Switch)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchType {
    /// Alter an existing value, if any. (`+`)
    Alter,
    /// Substitute a missing value with a default. (`-`)
    Default,
    /// Assign a default to the variable if the value is missing. (`=`)
    Assign,
    /// Error out if the value is missing. (`?`)
    Error,
}

impl SwitchType {
    /// The character that spells the switch type.
    #[must_use]
    pub fn as_char(self) -> char {
        use SwitchType::*;
        match self {
            Alter => '+',
            Default => '-',
            Assign => '=',
            Error => '?',
        }
    }
}

/// Condition that triggers a [switch](Switch)
///
/// In the lexical grammar, a switch condition is an optional colon that
/// precedes a switch type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchCondition {
    /// Without a colon, the switch triggers if the parameter is unset.
    Unset,
    /// With a colon, the switch triggers if the parameter is unset or empty.
    UnsetOrEmpty,
}

/// Parameter expansion modifier that conditionally substitutes the value
///
/// Examples of switches include `+foo`, `:-bar`, and `:=baz`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Switch {
    /// How the value is substituted
    pub r#type: SwitchType,
    /// Condition that determines whether the value is substituted or not
    pub condition: SwitchCondition,
    /// Word that substitutes the parameter value
    pub word: Word,
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.condition == SwitchCondition::UnsetOrEmpty {
            f.write_char(':')?;
        }
        write!(f, "{}{}", self.r#type.as_char(), self.word)
    }
}

/// Flag that specifies which side of the value is removed in a [trim](Trim)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrimSide {
    /// Beginning of the value (`#`)
    Prefix,
    /// End of the value (`%`)
    Suffix,
}

impl TrimSide {
    /// The character that spells the trim side.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            TrimSide::Prefix => '#',
            TrimSide::Suffix => '%',
        }
    }
}

/// Flag that specifies the pattern matching strategy in a [trim](Trim)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrimLength {
    /// Match as few characters as possible.
    Shortest,
    /// Match as many characters as possible.
    Longest,
}

/// Parameter expansion modifier that removes the beginning or end of the
/// value
///
/// Examples of trims include `#foo`, `##bar`, and `%%baz*`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trim {
    /// Which side of the value is removed
    pub side: TrimSide,
    /// How much of the value is matched
    pub length: TrimLength,
    /// Pattern matched against the value
    pub pattern: Word,
}

impl fmt::Display for Trim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.side.as_char())?;
        if self.length == TrimLength::Longest {
            f.write_char(self.side.as_char())?;
        }
        self.pattern.fmt(f)
    }
}

/// Parameter expansion modifier that selects a substring of the value
///
/// The offset and length are arithmetic expressions kept as raw text; they
/// are evaluated when the expansion is performed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Substr {
    /// Expression that computes the starting position
    pub offset: String,
    /// Expression that computes the number of characters taken
    pub length: Option<String>,
}

impl fmt::Display for Substr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.offset)?;
        if let Some(length) = &self.length {
            write!(f, ":{length}")?;
        }
        Ok(())
    }
}

/// Attribute that modifies a parameter expansion
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Modifier {
    /// No modifier
    None,
    /// `#` prefix (`${#foo}`)
    Length,
    /// `+`, `-`, `=`, or `?` suffix, optionally with `:` (`${foo:-bar}`)
    Switch(Switch),
    /// `#`, `##`, `%`, or `%%` suffix (`${foo%bar}`)
    Trim(Trim),
    /// `:offset` or `:offset:length` suffix (`${foo:1:2}`)
    Substr(Substr),
}

/// Parameter expansion enclosed in braces
///
/// This struct is used only for parameter expansions enclosed in braces.
/// Expansions that are not enclosed in braces are directly encoded with
/// [`TextUnit::RawParam`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BracedParam {
    /// Parameter to be expanded
    pub param: Param,
    /// Modifier
    pub modifier: Modifier,
    /// Position of this parameter expansion in the source code
    pub location: Location,
}

impl fmt::Display for BracedParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Modifier::*;
        match &self.modifier {
            None => write!(f, "${{{}}}", self.param),
            Length => write!(f, "${{#{}}}", self.param),
            Switch(switch) => write!(f, "${{{}{}}}", self.param, switch),
            Trim(trim) => write!(f, "${{{}{}}}", self.param, trim),
            Substr(substr) => write!(f, "${{{}{}}}", self.param, substr),
        }
    }
}

/// Element of a [`Text`], i.e., something that can be expanded
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TextUnit {
    /// Literal single character
    Literal(char),
    /// Backslash-escaped single character
    Backslashed(char),
    /// Parameter expansion that is not enclosed in braces
    RawParam {
        /// Parameter to be expanded
        param: Param,
        /// Position of this parameter expansion in the source code
        location: Location,
    },
    /// Parameter expansion that is enclosed in braces
    BracedParam(BracedParam),
    /// Command substitution of the form `$(...)`
    CommandSubst {
        /// Raw command text that will be re-parsed and executed when the
        /// command substitution is expanded
        content: String,
        /// Position of this command substitution in the source code
        location: Location,
    },
    /// Command substitution of the form `` `...` ``
    ///
    /// The content has backquote-specific backslash processing already
    /// applied, so it can be re-parsed the same way as `$(...)` content.
    Backquote {
        /// Command text that will be re-parsed and executed when the command
        /// substitution is expanded
        content: String,
        /// Position of this command substitution in the source code
        location: Location,
    },
    /// Arithmetic expansion of the form `$((...))`
    Arith {
        /// Raw expression text that will be expanded and evaluated when the
        /// arithmetic expansion is performed
        content: String,
        /// Position of this arithmetic expansion in the source code
        location: Location,
    },
}

pub use TextUnit::*;

/// String that may contain some expansions
///
/// A text is a sequence of [text unit](TextUnit)s, which may contain some
/// kinds of expansions but no quotations.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Text(pub Vec<TextUnit>);

impl Text {
    /// Creates a text of literal characters from a string.
    #[must_use]
    pub fn from_literal_chars(s: &str) -> Text {
        Text(s.chars().map(Literal).collect())
    }

    /// Returns the literal string value if the text contains no expansions
    /// or escapes.
    #[must_use]
    pub fn to_string_if_literal(&self) -> Option<String> {
        self.0
            .iter()
            .map(|unit| match unit {
                Literal(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for TextUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal(c) => f.write_char(*c),
            Backslashed(c) => write!(f, "\\{c}"),
            RawParam { param, .. } => write!(f, "${param}"),
            BracedParam(param) => param.fmt(f),
            CommandSubst { content, .. } => write!(f, "$({content})"),
            Backquote { content, .. } => write!(f, "`{content}`"),
            Arith { content, .. } => write!(f, "$(({content}))"),
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|unit| unit.fmt(f))
    }
}

/// Element of a [`Word`], i.e., text with quotes
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WordUnit {
    /// Unquoted [`TextUnit`] as a word unit
    Unquoted(TextUnit),
    /// String surrounded with a pair of single quotations
    SingleQuote(String),
    /// Text surrounded with a pair of double quotations
    DoubleQuote(Text),
}

pub use WordUnit::*;

impl fmt::Display for WordUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unquoted(unit) => unit.fmt(f),
            SingleQuote(s) => write!(f, "'{s}'"),
            DoubleQuote(text) => write!(f, "\"{text}\""),
        }
    }
}

/// Token that may involve expansions and quotes
///
/// A word is a sequence of [word unit](WordUnit)s. It depends on context
/// whether an empty word is valid or not. It is the parser's responsibility
/// to reject an empty word in a context where it cannot appear.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    /// Word units that constitute the word
    pub units: Vec<WordUnit>,
    /// Position of the word in the source code
    pub location: Location,
}

impl Word {
    /// Creates a word of literal characters with a dummy location.
    ///
    /// This is mainly useful in tests.
    #[must_use]
    pub fn from_literal<S: AsRef<str>>(s: S) -> Word {
        Word {
            units: s.as_ref().chars().map(|c| Unquoted(Literal(c))).collect(),
            location: Location::dummy(),
        }
    }

    /// Whether the word contains no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns the literal string value if the word contains no quotations,
    /// escapes, or expansions.
    ///
    /// This is the form used to test a word against reserved words, alias
    /// names, and function names.
    #[must_use]
    pub fn to_string_if_literal(&self) -> Option<String> {
        self.units
            .iter()
            .map(|unit| match unit {
                Unquoted(Literal(c)) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Removes quotations from the word, returning the unquoted string and
    /// whether any quotation was present.
    ///
    /// Expansions are rendered in their source form. This is the form used
    /// for here-document delimiters, where the presence of quoting decides
    /// whether the contents are expanded.
    #[must_use]
    pub fn unquote(&self) -> (String, bool) {
        let mut result = String::new();
        let mut quoted = false;
        for unit in &self.units {
            match unit {
                Unquoted(Literal(c)) => result.push(*c),
                Unquoted(Backslashed(c)) => {
                    result.push(*c);
                    quoted = true;
                }
                Unquoted(unit) => {
                    let _ = write!(result, "{unit}");
                }
                SingleQuote(s) => {
                    result.push_str(s);
                    quoted = true;
                }
                DoubleQuote(text) => {
                    let _ = write!(result, "{text}");
                    quoted = true;
                }
            }
        }
        (result, quoted)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.units.iter().try_for_each(|unit| unit.fmt(f))
    }
}

/// Assignment word
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assign {
    /// Name of the variable to assign to
    ///
    /// In the valid assignment syntax, the name is a non-empty POSIX
    /// identifier.
    pub name: String,
    /// Value assigned to the variable
    pub value: Word,
    /// Location of the whole assignment word
    pub location: Location,
}

impl fmt::Display for Assign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Redirection operators
///
/// This enum defines the redirection operator types except here-documents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirOp {
    /// `<` (open a file for input)
    FileIn,
    /// `<>` (open a file for input and output)
    FileInOut,
    /// `>` (open a file for output; fail if existing and `noclobber` is set)
    FileOut,
    /// `>>` (open a file for output; append if existing)
    FileAppend,
    /// `>|` (open a file for output; always truncate if existing)
    FileClobber,
    /// `<&` (copy or close a file descriptor for input)
    FdIn,
    /// `>&` (copy or close a file descriptor for output)
    FdOut,
}

/// Error indicating that an operator token is not a redirection operator
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TryFromOperatorError;

impl TryFrom<Operator> for RedirOp {
    type Error = TryFromOperatorError;
    fn try_from(op: Operator) -> Result<RedirOp, TryFromOperatorError> {
        use Operator::*;
        match op {
            Less => Ok(RedirOp::FileIn),
            LessGreater => Ok(RedirOp::FileInOut),
            Greater => Ok(RedirOp::FileOut),
            GreaterGreater => Ok(RedirOp::FileAppend),
            GreaterBar => Ok(RedirOp::FileClobber),
            LessAnd => Ok(RedirOp::FdIn),
            GreaterAnd => Ok(RedirOp::FdOut),
            _ => Err(TryFromOperatorError),
        }
    }
}

impl fmt::Display for RedirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RedirOp::*;
        let s = match self {
            FileIn => "<",
            FileInOut => "<>",
            FileOut => ">",
            FileAppend => ">>",
            FileClobber => ">|",
            FdIn => "<&",
            FdOut => ">&",
        };
        f.write_str(s)
    }
}

/// Here-document
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HereDoc {
    /// Token that marks the end of the content of the here-document
    pub delimiter: Word,

    /// Whether leading tab characters should be removed from each content
    /// line and the delimiter line
    ///
    /// This value is `true` for the `<<-` operator and `false` for `<<`.
    pub remove_tabs: bool,

    /// Content of the here-document
    ///
    /// The content ends with a newline unless it is empty. If the delimiter
    /// is quoted, the content is all literal.
    ///
    /// The content is wrapped in `OnceCell` because it is lexed separately
    /// from the operator and delimiter: the lexer produces the content only
    /// after the current command line is terminated by a newline. Once the
    /// whole command is parsed, the cell is guaranteed to be filled.
    pub content: OnceCell<Text>,
}

/// Part of a redirection that defines the nature of the resulting file
/// descriptor
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RedirBody {
    /// Normal redirection
    Normal {
        /// Operator that selects how the file descriptor is opened
        operator: RedirOp,
        /// Word naming the file or file descriptor
        operand: Word,
    },
    /// Here-document
    HereDoc(Rc<HereDoc>),
}

impl RedirBody {
    /// Returns the operand word of the redirection.
    #[must_use]
    pub fn operand(&self) -> &Word {
        match self {
            RedirBody::Normal { operand, .. } => operand,
            RedirBody::HereDoc(here_doc) => &here_doc.delimiter,
        }
    }
}

impl fmt::Display for RedirBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirBody::Normal { operator, operand } => write!(f, "{operator}{operand}"),
            RedirBody::HereDoc(here_doc) => {
                let operator = if here_doc.remove_tabs { "<<-" } else { "<<" };
                write!(f, "{operator}{}", here_doc.delimiter)
            }
        }
    }
}

/// Redirection
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redir {
    /// File descriptor that is modified by this redirection
    pub fd: Option<Fd>,
    /// Nature of the resulting file descriptor
    pub body: RedirBody,
}

impl Redir {
    /// Computes the file descriptor that is modified by this redirection.
    ///
    /// If `self.fd` is `Some(_)`, its value is returned intact. Otherwise,
    /// the default file descriptor is selected depending on the operator.
    #[must_use]
    pub fn fd_or_default(&self) -> Fd {
        use RedirOp::*;
        self.fd.unwrap_or(match &self.body {
            RedirBody::Normal { operator, .. } => match operator {
                FileIn | FileInOut | FdIn => Fd::STDIN,
                FileOut | FileAppend | FileClobber | FdOut => Fd::STDOUT,
            },
            RedirBody::HereDoc { .. } => Fd::STDIN,
        })
    }
}

impl fmt::Display for Redir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fd) = self.fd {
            write!(f, "{fd}")?;
        }
        self.body.fmt(f)
    }
}

/// Command that involves assignments, redirections, and word expansions
///
/// In the shell language syntax, a valid simple command must contain at
/// least one of assignments, words, and redirections; the parser never
/// produces a completely empty simple command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SimpleCommand {
    /// Assignments
    pub assigns: Vec<Assign>,
    /// Command name and arguments
    pub words: Vec<Word>,
    /// Redirections
    pub redirs: Vec<Redir>,
}

impl SimpleCommand {
    /// Returns true if the simple command contains no assignments, words, or
    /// redirections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigns.is_empty() && self.words.is_empty() && self.redirs.is_empty()
    }
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut space = |f: &mut fmt::Formatter<'_>| {
            if first {
                first = false;
                Ok(())
            } else {
                f.write_char(' ')
            }
        };
        for assign in &self.assigns {
            space(f)?;
            assign.fmt(f)?;
        }
        for word in &self.words {
            space(f)?;
            word.fmt(f)?;
        }
        for redir in &self.redirs {
            space(f)?;
            redir.fmt(f)?;
        }
        Ok(())
    }
}

/// `elif-then` clause of an if command
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElifThen {
    pub condition: List,
    pub body: List,
}

/// Symbol that terminates the body of a case branch and determines what to
/// do after executing it
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CaseContinuation {
    /// `;;` (terminate the case construct)
    #[default]
    Break,
    /// `;&` (unconditionally execute the body of the next case branch)
    FallThrough,
}

impl fmt::Display for CaseContinuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseContinuation::Break => ";;",
            CaseContinuation::FallThrough => ";&",
        };
        f.write_str(s)
    }
}

/// Branch item of a `case` compound command
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseItem {
    /// Array of patterns matched against the subject word of the case
    /// command
    ///
    /// A syntactically valid case item has at least one pattern.
    pub patterns: Vec<Word>,
    /// Commands executed if any of the patterns matched
    pub body: List,
    /// What to do after executing the body of this item
    pub continuation: CaseContinuation,
}

impl fmt::Display for CaseItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        let mut first = true;
        for pattern in &self.patterns {
            if !first {
                f.write_char('|')?;
            }
            first = false;
            pattern.fmt(f)?;
        }
        f.write_str(") ")?;
        if !self.body.0.is_empty() {
            write!(f, "{} ", self.body)?;
        }
        self.continuation.fmt(f)
    }
}

/// Command that contains other commands
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompoundCommand {
    /// List as a command, surrounded with `{ }`
    Grouping(List),
    /// Command for executing commands in a subshell, surrounded with `( )`
    Subshell(List),
    /// For loop
    For {
        /// Word naming the loop variable
        name: Word,
        /// Words the loop iterates over
        ///
        /// `None` means the `in` clause is absent and the loop iterates over
        /// the positional parameters.
        values: Option<Vec<Word>>,
        /// Commands executed in each iteration
        body: List,
    },
    /// While loop
    While { condition: List, body: List },
    /// Until loop
    Until { condition: List, body: List },
    /// If conditional construct
    If {
        condition: List,
        body: List,
        elifs: Vec<ElifThen>,
        r#else: Option<List>,
    },
    /// Case conditional construct
    Case { subject: Word, items: Vec<CaseItem> },
}

/// Writes a list followed by a separator and the given clause word.
///
/// The separator is a semicolon unless the last item of the list is
/// asynchronous, in which case the `&` printed as part of the list already
/// acts as the separator.
fn write_clause(f: &mut fmt::Formatter<'_>, list: &List, next: &str) -> fmt::Result {
    if list.0.last().is_some_and(|item| item.is_async) {
        write!(f, "{list} {next}")
    } else {
        write!(f, "{list}; {next}")
    }
}

impl fmt::Display for CompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CompoundCommand::*;
        match self {
            Grouping(list) => {
                f.write_str("{ ")?;
                write_clause(f, list, "}")
            }
            Subshell(list) => write!(f, "({list})"),
            For { name, values, body } => {
                write!(f, "for {name}")?;
                if let Some(values) = values {
                    f.write_str(" in")?;
                    for value in values {
                        write!(f, " {value}")?;
                    }
                }
                f.write_str("; do ")?;
                write_clause(f, body, "done")
            }
            While { condition, body } => {
                f.write_str("while ")?;
                write_clause(f, condition, "do ")?;
                write_clause(f, body, "done")
            }
            Until { condition, body } => {
                f.write_str("until ")?;
                write_clause(f, condition, "do ")?;
                write_clause(f, body, "done")
            }
            If {
                condition,
                body,
                elifs,
                r#else,
            } => {
                f.write_str("if ")?;
                write_clause(f, condition, "then ")?;
                write_clause(f, body, "")?;
                for ElifThen { condition, body } in elifs {
                    f.write_str("elif ")?;
                    write_clause(f, condition, "then ")?;
                    write_clause(f, body, "")?;
                }
                if let Some(r#else) = r#else {
                    f.write_str("else ")?;
                    write_clause(f, r#else, "")?;
                }
                f.write_str("fi")
            }
            Case { subject, items } => {
                write!(f, "case {subject} in")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                f.write_str(" esac")
            }
        }
    }
}

/// Compound command with redirections
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FullCompoundCommand {
    /// The main part
    pub command: CompoundCommand,
    /// Redirections
    pub redirs: Vec<Redir>,
}

impl fmt::Display for FullCompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.command.fmt(f)?;
        self.redirs
            .iter()
            .try_for_each(|redir| write!(f, " {redir}"))
    }
}

/// Function definition command
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionDefinition {
    /// Function name
    pub name: Word,
    /// Function body
    ///
    /// The body is reference-counted so that defining the function in the
    /// function store does not clone the whole tree.
    pub body: Rc<FullCompoundCommand>,
}

impl fmt::Display for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}() {}", self.name, self.body)
    }
}

/// Element of a pipe sequence
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Simple command
    Simple(SimpleCommand),
    /// Compound command
    Compound(FullCompoundCommand),
    /// Function definition command
    Function(FunctionDefinition),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Simple(command) => command.fmt(f),
            Command::Compound(command) => command.fmt(f),
            Command::Function(command) => command.fmt(f),
        }
    }
}

/// Commands separated by `|`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pipeline {
    /// Elements of the pipeline
    ///
    /// A valid pipeline has at least one command.
    pub commands: Vec<Command>,
    /// Whether the pipeline begins with a `!`
    pub negation: bool,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negation {
            f.write_str("! ")?;
        }
        let mut first = true;
        for command in &self.commands {
            if !first {
                f.write_str(" | ")?;
            }
            first = false;
            command.fmt(f)?;
        }
        Ok(())
    }
}

/// Condition that decides if a [`Pipeline`] in an [and-or list](AndOrList)
/// should be executed
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AndOr {
    /// `&&`
    AndThen,
    /// `||`
    OrElse,
}

impl fmt::Display for AndOr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AndOr::AndThen => f.write_str("&&"),
            AndOr::OrElse => f.write_str("||"),
        }
    }
}

/// Pipelines separated by `&&` and `||`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AndOrList {
    pub first: Pipeline,
    pub rest: Vec<(AndOr, Pipeline)>,
}

impl fmt::Display for AndOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.first.fmt(f)?;
        self.rest
            .iter()
            .try_for_each(|(condition, pipeline)| write!(f, " {condition} {pipeline}"))
    }
}

/// Element of a [`List`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    /// Main part of this item
    pub and_or: AndOrList,
    /// Whether the item is terminated by `&` and executed asynchronously
    pub is_async: bool,
}

/// Sequence of [and-or lists](AndOrList) separated by `;` or `&`
///
/// It depends on context whether an empty list is valid or not.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct List(pub Vec<Item>);

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.0.len();
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            item.and_or.fmt(f)?;
            if item.is_async {
                f.write_char('&')?;
            } else if i + 1 < count {
                f.write_char(';')?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Word {
        Word::from_literal(s)
    }

    fn simple(words: &[&str]) -> Command {
        Command::Simple(SimpleCommand {
            assigns: vec![],
            words: words.iter().map(|w| word(w)).collect(),
            redirs: vec![],
        })
    }

    fn item(words: &[&str]) -> Item {
        Item {
            and_or: AndOrList {
                first: Pipeline {
                    commands: vec![simple(words)],
                    negation: false,
                },
                rest: vec![],
            },
            is_async: false,
        }
    }

    #[test]
    fn param_classification() {
        assert_eq!(Param::from_id("foo").r#type, ParamType::Variable);
        assert_eq!(Param::from_id("_x9").r#type, ParamType::Variable);
        assert_eq!(
            Param::from_id("0").r#type,
            ParamType::Special(SpecialParam::Zero)
        );
        assert_eq!(Param::from_id("3").r#type, ParamType::Positional(3));
        assert_eq!(Param::from_id("12").r#type, ParamType::Positional(12));
        assert_eq!(
            Param::from_id("@").r#type,
            ParamType::Special(SpecialParam::At)
        );
        assert_eq!(
            Param::from_id("?").r#type,
            ParamType::Special(SpecialParam::Question)
        );
    }

    #[test]
    fn word_to_string_if_literal() {
        assert_eq!(word("foo").to_string_if_literal(), Some("foo".to_string()));

        let mut w = word("foo");
        w.units.push(SingleQuote("bar".to_string()));
        assert_eq!(w.to_string_if_literal(), None);
    }

    #[test]
    fn word_unquote() {
        assert_eq!(word("foo").unquote(), ("foo".to_string(), false));

        let w = Word {
            units: vec![
                Unquoted(Literal('a')),
                SingleQuote("b c".to_string()),
                Unquoted(Backslashed('d')),
                DoubleQuote(Text::from_literal_chars("e")),
            ],
            location: Location::dummy(),
        };
        assert_eq!(w.unquote(), ("ab cde".to_string(), true));
    }

    #[test]
    fn redir_fd_or_default() {
        let redir = Redir {
            fd: None,
            body: RedirBody::Normal {
                operator: RedirOp::FileIn,
                operand: word("file"),
            },
        };
        assert_eq!(redir.fd_or_default(), Fd::STDIN);

        let redir = Redir {
            fd: None,
            body: RedirBody::Normal {
                operator: RedirOp::FileAppend,
                operand: word("file"),
            },
        };
        assert_eq!(redir.fd_or_default(), Fd::STDOUT);

        let redir = Redir {
            fd: Some(Fd(5)),
            body: RedirBody::Normal {
                operator: RedirOp::FileIn,
                operand: word("file"),
            },
        };
        assert_eq!(redir.fd_or_default(), Fd(5));
    }

    #[test]
    fn display_simple_command() {
        let command = SimpleCommand {
            assigns: vec![Assign {
                name: "x".to_string(),
                value: word("1"),
                location: Location::dummy(),
            }],
            words: vec![word("echo"), word("ok")],
            redirs: vec![Redir {
                fd: Some(Fd(2)),
                body: RedirBody::Normal {
                    operator: RedirOp::FileOut,
                    operand: word("log"),
                },
            }],
        };
        assert_eq!(command.to_string(), "x=1 echo ok 2>log");
    }

    #[test]
    fn display_braced_params() {
        let param = BracedParam {
            param: Param::from_id("foo"),
            modifier: Modifier::None,
            location: Location::dummy(),
        };
        assert_eq!(param.to_string(), "${foo}");

        let param = BracedParam {
            param: Param::from_id("foo"),
            modifier: Modifier::Length,
            location: Location::dummy(),
        };
        assert_eq!(param.to_string(), "${#foo}");

        let param = BracedParam {
            param: Param::from_id("foo"),
            modifier: Modifier::Switch(Switch {
                r#type: SwitchType::Default,
                condition: SwitchCondition::UnsetOrEmpty,
                word: word("bar"),
            }),
            location: Location::dummy(),
        };
        assert_eq!(param.to_string(), "${foo:-bar}");

        let param = BracedParam {
            param: Param::from_id("foo"),
            modifier: Modifier::Trim(Trim {
                side: TrimSide::Suffix,
                length: TrimLength::Longest,
                pattern: word("*.c"),
            }),
            location: Location::dummy(),
        };
        assert_eq!(param.to_string(), "${foo%%*.c}");

        let param = BracedParam {
            param: Param::from_id("foo"),
            modifier: Modifier::Substr(Substr {
                offset: "1".to_string(),
                length: Some("2".to_string()),
            }),
            location: Location::dummy(),
        };
        assert_eq!(param.to_string(), "${foo:1:2}");
    }

    #[test]
    fn display_pipeline_and_list() {
        let list = List(vec![item(&["a"]), item(&["b"])]);
        assert_eq!(list.to_string(), "a; b");

        let mut list = List(vec![item(&["a"]), item(&["b"])]);
        list.0[0].is_async = true;
        assert_eq!(list.to_string(), "a& b");

        let pipeline = Pipeline {
            commands: vec![simple(&["a"]), simple(&["b", "c"])],
            negation: true,
        };
        assert_eq!(pipeline.to_string(), "! a | b c");
    }

    #[test]
    fn display_compound_commands() {
        let body = List(vec![item(&["b"])]);
        let condition = List(vec![item(&["a"])]);

        let command = CompoundCommand::Grouping(body.clone());
        assert_eq!(command.to_string(), "{ b; }");

        let command = CompoundCommand::Subshell(body.clone());
        assert_eq!(command.to_string(), "(b)");

        let command = CompoundCommand::If {
            condition: condition.clone(),
            body: body.clone(),
            elifs: vec![],
            r#else: None,
        };
        assert_eq!(command.to_string(), "if a; then b; fi");

        let command = CompoundCommand::If {
            condition: condition.clone(),
            body: body.clone(),
            elifs: vec![ElifThen {
                condition: List(vec![item(&["c"])]),
                body: List(vec![item(&["d"])]),
            }],
            r#else: Some(List(vec![item(&["e"])])),
        };
        assert_eq!(
            command.to_string(),
            "if a; then b; elif c; then d; else e; fi"
        );

        let command = CompoundCommand::While {
            condition: condition.clone(),
            body: body.clone(),
        };
        assert_eq!(command.to_string(), "while a; do b; done");

        let command = CompoundCommand::For {
            name: word("i"),
            values: Some(vec![word("1"), word("2")]),
            body: body.clone(),
        };
        assert_eq!(command.to_string(), "for i in 1 2; do b; done");

        let command = CompoundCommand::For {
            name: word("i"),
            values: None,
            body: body.clone(),
        };
        assert_eq!(command.to_string(), "for i; do b; done");

        let command = CompoundCommand::Case {
            subject: word("x"),
            items: vec![CaseItem {
                patterns: vec![word("a"), word("b")],
                body: List(vec![item(&["c"])]),
                continuation: CaseContinuation::Break,
            }],
        };
        assert_eq!(command.to_string(), "case x in (a|b) c ;; esac");
    }

    #[test]
    fn display_function_definition() {
        let definition = FunctionDefinition {
            name: word("f"),
            body: Rc::new(FullCompoundCommand {
                command: CompoundCommand::Grouping(List(vec![item(&["a"])])),
                redirs: vec![],
            }),
        };
        assert_eq!(definition.to_string(), "f() { a; }");
    }
}
