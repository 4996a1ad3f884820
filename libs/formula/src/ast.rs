//! Expression tree built while parsing a formula
//!
//! Every node carries the weight accumulated so far. Scaling a node pushes the
//! factor down into each child independently and re-derives the node's own
//! weight as the sum of its children, so leaves always hold their final
//! fraction once the parse returns.

use crate::error::Result;
use crate::functions::Builtin;
use crate::rational::Rational;

/// Parse-time node
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// Parenthesized `+`-separated list (or the implicit top-level list)
    Group {
        children: Vec<ExpressionNode>,
        weight: Rational,
    },

    /// Variable or plain number
    Leaf {
        variable: Option<String>,
        multiplier: Option<f64>,
        weight: Rational,
    },

    /// Builtin function applied to its arguments
    Call {
        function: Builtin,
        args: Vec<ExpressionNode>,
        weight: Rational,
    },
}

/// A flattened variable together with its exact weight
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub name: String,
    pub weight: Rational,
}

impl ExpressionNode {
    pub fn group(children: Vec<ExpressionNode>) -> Result<Self> {
        let weight = count_fractions(&children)?;
        Ok(ExpressionNode::Group { children, weight })
    }

    pub fn leaf(variable: Option<String>, multiplier: Option<f64>) -> Self {
        ExpressionNode::Leaf {
            variable,
            multiplier,
            weight: Rational::ONE,
        }
    }

    pub fn call(function: Builtin, args: Vec<ExpressionNode>) -> Result<Self> {
        let weight = count_fractions(&args)?;
        Ok(ExpressionNode::Call {
            function,
            args,
            weight,
        })
    }

    pub fn weight(&self) -> Rational {
        match self {
            ExpressionNode::Group { weight, .. }
            | ExpressionNode::Leaf { weight, .. }
            | ExpressionNode::Call { weight, .. } => *weight,
        }
    }

    /// Multiply the weight of this node and of every descendant by `factor`
    pub fn scale(self, factor: Rational) -> Result<Self> {
        self.map_weights(&|weight| weight.multiply(factor))
    }

    /// Divide the weight of this node and of every descendant by `divisor`
    pub fn divide(self, divisor: Rational) -> Result<Self> {
        self.map_weights(&|weight| weight.divide(divisor))
    }

    fn map_weights<F>(self, op: &F) -> Result<Self>
    where
        F: Fn(Rational) -> Result<Rational>,
    {
        match self {
            ExpressionNode::Leaf {
                variable,
                multiplier,
                weight,
            } => Ok(ExpressionNode::Leaf {
                variable,
                multiplier,
                weight: op(weight)?,
            }),
            ExpressionNode::Group { children, .. } => {
                ExpressionNode::group(map_all(children, op)?)
            }
            ExpressionNode::Call { function, args, .. } => {
                ExpressionNode::call(function, map_all(args, op)?)
            }
        }
    }

    /// Collect the variable leaves in source order
    pub fn flatten(self) -> Vec<WeightedTerm> {
        let mut terms = Vec::new();
        self.flatten_into(&mut terms);
        terms
    }

    fn flatten_into(self, out: &mut Vec<WeightedTerm>) {
        match self {
            ExpressionNode::Leaf {
                variable: Some(name),
                weight,
                ..
            } => out.push(WeightedTerm { name, weight }),
            // numbers only ever scale their ancestors
            ExpressionNode::Leaf { variable: None, .. } => {}
            ExpressionNode::Group { mut children, .. } if children.len() == 1 => {
                if let Some(child) = children.pop() {
                    child.flatten_into(out);
                }
            }
            ExpressionNode::Group { children, .. } => {
                for child in children {
                    child.flatten_into(out);
                }
            }
            ExpressionNode::Call { args, .. } => {
                for arg in args {
                    arg.flatten_into(out);
                }
            }
        }
    }
}

fn map_all<F>(nodes: Vec<ExpressionNode>, op: &F) -> Result<Vec<ExpressionNode>>
where
    F: Fn(Rational) -> Result<Rational>,
{
    nodes.into_iter().map(|node| node.map_weights(op)).collect()
}

/// Sum of the children's weights, reduced
fn count_fractions(children: &[ExpressionNode]) -> Result<Rational> {
    let Some((first, rest)) = children.split_first() else {
        return Ok(Rational::ZERO);
    };
    rest.iter()
        .try_fold(first.weight(), |sum, child| sum.add(child.weight()))
        .map(|sum| sum.reduced())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> ExpressionNode {
        ExpressionNode::leaf(Some(name.to_string()), None)
    }

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d).unwrap()
    }

    #[test]
    fn test_group_weight_is_sum_of_children() {
        let group = ExpressionNode::group(vec![var("a"), var("b"), var("c")]).unwrap();
        assert_eq!(group.weight(), Rational::from_integer(3));
    }

    #[test]
    fn test_scaling_reaches_leaves() {
        let inner = ExpressionNode::group(vec![var("b"), var("c")])
            .unwrap()
            .divide(Rational::from_integer(2))
            .unwrap()
            .scale(Rational::from_integer(5))
            .unwrap();
        assert_eq!(inner.weight(), Rational::from_integer(5));

        let outer = ExpressionNode::group(vec![var("a"), inner, var("d")])
            .unwrap()
            .divide(Rational::from_integer(7))
            .unwrap();
        assert_eq!(outer.weight(), Rational::ONE);

        let terms = outer.flatten();
        let weights: Vec<_> = terms.iter().map(|t| t.weight).collect();
        assert_eq!(weights, vec![r(1, 7), r(5, 14), r(5, 14), r(1, 7)]);
    }

    #[test]
    fn test_numeric_leaf_is_dropped() {
        let group = ExpressionNode::group(vec![var("a"), ExpressionNode::leaf(None, Some(2.0))])
            .unwrap();
        let names: Vec<_> = group.flatten().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_single_child_group_unwraps() {
        let nested = ExpressionNode::group(vec![ExpressionNode::group(vec![var("x")]).unwrap()])
            .unwrap();
        let terms = nested.flatten();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].name, "x");
        assert_eq!(terms[0].weight, Rational::ONE);
    }
}
