//! Formula compiler - converts formula text into weighted grade entities
//!
//! Recursive descent over the grammar
//!
//! ```text
//! formula := expr ('+' expr)* EOF
//! expr    := [number ['*']] ( '(' expr ('+' expr)* ')' [['*'] number]
//!                           | identifier '(' expr (',' expr)* ')'
//!                           | identifier )
//!            ['/' number]
//! ```
//!
//! Multipliers and divisors are folded into exact [`Rational`] weights while
//! parsing. The finished tree is flattened into its variables, whose weights
//! are then normalized to integers.

use crate::ast::{ExpressionNode, WeightedTerm};
use crate::error::{Error, Result};
use crate::functions::Builtin;
use crate::lexer::{CharSource, Lexer};
use crate::literal::{parse_identifier, parse_number};
use crate::rational::{common_denominator, Rational};
use crate::solver::GradeEntity;
use std::collections::HashMap;
use tracing::{debug, trace};

const MAX_RECURSION_DEPTH: usize = 200;

/// How fractional weights become integer weightings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WeightNormalization {
    /// Scale every weight to the least common denominator and keep the
    /// numerators. Preserves the ratios between all entities.
    #[default]
    CommonDenominator,
    /// Keep each reduced numerator as is. Entities whose weights have
    /// different denominators are not comparable under this mode.
    NumeratorOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    pub normalization: WeightNormalization,
    /// Maximum nesting of parentheses and calls.
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            normalization: WeightNormalization::default(),
            max_depth: MAX_RECURSION_DEPTH,
        }
    }
}

/// Result of compiling a formula
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledFormula {
    /// Entities in source order, names unique
    pub entities: Vec<GradeEntity>,
    /// Exact sum of all term weights at the top level
    pub total_weight: Rational,
}

/// Compile formula text with the given options
pub fn compile(formula: &str, options: &CompileOptions) -> Result<CompiledFormula> {
    let compiled = Compiler::new(formula.chars(), options.clone()).compile()?;
    debug!(
        formula,
        entities = compiled.entities.len(),
        total_weight = %compiled.total_weight,
        "compiled formula"
    );
    Ok(compiled)
}

/// Parser for formula text
pub struct Compiler<S: CharSource> {
    lexer: Lexer<S>,
    options: CompileOptions,
    depth: usize,
}

impl<S: CharSource> Compiler<S> {
    pub fn new(source: S, options: CompileOptions) -> Self {
        Self {
            lexer: Lexer::new(source),
            options,
            depth: 0,
        }
    }

    /// Parse, flatten and normalize
    pub fn compile(mut self) -> Result<CompiledFormula> {
        let root = self.parse()?;
        let total_weight = root.weight();
        let entities = normalize(root.flatten(), self.options.normalization)?;
        Ok(CompiledFormula {
            entities,
            total_weight,
        })
    }

    /// Parse the entire formula (top-level entry point)
    pub fn parse(&mut self) -> Result<ExpressionNode> {
        let mut terms = vec![self.parse_expression()?];
        while self.lexer.is_next('+') {
            terms.push(self.parse_expression()?);
        }

        // Ensure we've consumed all input
        self.lexer.skip_blanks();
        if !self.lexer.is_eof() {
            return Err(self.lexer.unexpected());
        }

        ExpressionNode::group(terms)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(Error::TooDeep {
                max: self.options.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_expression(&mut self) -> Result<ExpressionNode> {
        self.enter()?;
        self.lexer.skip_blanks();
        let start = self.lexer.position();

        // exponents off: `5exam` is 5 times `exam`
        let mut multiplier = parse_number(&mut self.lexer, false)?;
        let starred = multiplier.is_some() && self.lexer.is_next('*');

        let node = if self.lexer.is_next('(') {
            let children = self.parse_list('+')?;
            if multiplier.is_none() {
                multiplier = self.parse_trailing_multiplier()?;
            }
            ExpressionNode::group(children)?
        } else {
            self.lexer.skip_blanks();
            let name = parse_identifier(&mut self.lexer);
            if !name.is_empty() && self.lexer.peek() == Some('(') {
                self.lexer.pop();
                self.parse_call(name)?
            } else if !name.is_empty() {
                ExpressionNode::leaf(Some(name), multiplier)
            } else if multiplier.is_some() && !starred {
                ExpressionNode::leaf(None, multiplier)
            } else {
                return Err(self.missing_term(start));
            }
        };

        let divisor = self.parse_divisor()?;
        let node = apply_factors(node, multiplier, divisor)?;
        self.leave();
        Ok(node)
    }

    /// Parse `separator`-delimited expressions up to the closing `)`
    fn parse_list(&mut self, separator: char) -> Result<Vec<ExpressionNode>> {
        let mut items = vec![self.parse_expression()?];
        while self.lexer.is_next(separator) {
            items.push(self.parse_expression()?);
        }
        self.lexer.expect(')')?;
        Ok(items)
    }

    fn parse_call(&mut self, name: String) -> Result<ExpressionNode> {
        let function = Builtin::lookup(&name).ok_or(Error::UnknownFunction(name))?;
        let args = self.parse_list(',')?;
        function.validate_args(args.len())?;
        trace!(%function, args = args.len(), "parsed call");
        ExpressionNode::call(function, args)
    }

    /// `(...)*5` and `(...)5`
    fn parse_trailing_multiplier(&mut self) -> Result<Option<f64>> {
        if self.lexer.is_next('*') {
            self.lexer.skip_blanks();
            let pos = self.lexer.position();
            return parse_number(&mut self.lexer, true)?
                .map(Some)
                .ok_or(Error::ExpectedNumber { pos });
        }
        self.lexer.skip_blanks();
        // a sign here would be the next `+` separator
        match self.lexer.peek() {
            Some(c) if c.is_ascii_digit() || c == '.' => parse_number(&mut self.lexer, true),
            _ => Ok(None),
        }
    }

    fn parse_divisor(&mut self) -> Result<Option<f64>> {
        if !self.lexer.is_next('/') {
            return Ok(None);
        }
        self.lexer.skip_blanks();
        let pos = self.lexer.position();
        parse_number(&mut self.lexer, true)?
            .map(Some)
            .ok_or(Error::ExpectedNumber { pos })
    }

    fn missing_term(&self, start: usize) -> Error {
        match self.lexer.peek() {
            None | Some(')' | '+' | ',' | '/' | '*') => Error::VariableRequired { pos: start },
            Some(_) => self.lexer.unexpected(),
        }
    }
}

fn apply_factors(
    node: ExpressionNode,
    multiplier: Option<f64>,
    divisor: Option<f64>,
) -> Result<ExpressionNode> {
    let node = match multiplier {
        Some(m) => node.scale(Rational::from_f64(m)?)?,
        None => node,
    };
    match divisor {
        Some(d) => node.divide(Rational::from_f64(d)?),
        None => Ok(node),
    }
}

/// Turn flattened terms into entities with integer weightings
fn normalize(terms: Vec<WeightedTerm>, mode: WeightNormalization) -> Result<Vec<GradeEntity>> {
    let terms = merge_duplicates(terms)?;

    let weightings: Vec<i64> = match mode {
        WeightNormalization::CommonDenominator => {
            let denom = common_denominator(terms.iter().map(|t| &t.weight))?;
            terms
                .iter()
                .map(|t| t.weight.numer_over(denom))
                .collect::<Result<_>>()?
        }
        WeightNormalization::NumeratorOnly => {
            let mut denominators: Vec<i64> = Vec::new();
            for term in &terms {
                let denom = term.weight.denom();
                if !denominators.contains(&denom) {
                    denominators.push(denom);
                }
            }
            terms
                .iter()
                .map(|t| {
                    let mut weight = t.weight;
                    for &denom in &denominators {
                        if weight.denom() != denom {
                            let denom = Rational::from_integer(denom);
                            weight = weight.multiply(denom)?.divide(denom)?;
                        }
                    }
                    Ok(weight.reduced().numer())
                })
                .collect::<Result<_>>()?
        }
    };

    terms
        .into_iter()
        .zip(weightings)
        .map(|(term, weighting)| {
            let weighting = u64::try_from(weighting)
                .ok()
                .filter(|w| *w >= 1)
                .ok_or_else(|| Error::InvalidWeight {
                    name: term.name.clone(),
                })?;
            trace!(name = %term.name, weight = %term.weight, weighting, "entity");
            Ok(GradeEntity::new(term.name, weighting))
        })
        .collect()
}

/// A name used twice (`a + a`) is one entity carrying both weights
fn merge_duplicates(terms: Vec<WeightedTerm>) -> Result<Vec<WeightedTerm>> {
    let mut merged: Vec<WeightedTerm> = Vec::with_capacity(terms.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for term in terms {
        match index.get(&term.name) {
            Some(&i) => {
                merged[i].weight = merged[i].weight.add(term.weight)?;
            }
            None => {
                index.insert(term.name.clone(), merged.len());
                merged.push(term);
            }
        }
    }

    Ok(merged)
}
