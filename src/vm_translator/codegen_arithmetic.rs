/// codegen_arithmetic.rs
/// Arithmetic, logical and comparison emission for CodeWriter
///
use crate::vm_translator::codegen::{AsmBlock, CodeWriter};
use crate::vm_translator::command::{ArithmeticOp, Comparison, OpTemplate, Outcome, Placement, SignCase};
use crate::vm_translator::error::TranslatorError;
use log::debug;
use std::io::Write;

/// Label block owned by one comparison
struct ComparisonLabels {
    y_negative: String,
    difference: String,
    true_branch: String,
    false_branch: String,
    end: String,
}

impl ComparisonLabels {
    fn new(id: usize) -> Self {
        ComparisonLabels {
            y_negative: format!("CMP$YNEG${}", id),
            difference: format!("CMP$DIFF${}", id),
            true_branch: format!("CMP$TRUE${}", id),
            false_branch: format!("CMP$FALSE${}", id),
            end: format!("CMP$END${}", id),
        }
    }

    fn target(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::True => &self.true_branch,
            Outcome::False => &self.false_branch,
            Outcome::Subtract => &self.difference,
        }
    }
}

impl<W: Write> CodeWriter<W> {
    pub fn write_arithmetic(&mut self, op: ArithmeticOp) -> Result<(), TranslatorError> {
        let block = match op.template() {
            OpTemplate::Binary(operator) => binary_operation(operator),
            OpTemplate::Unary(operator, placement) => unary_operation(operator, placement),
            OpTemplate::Compare(comparison) => {
                let id = self.ctx.next_comparison_id();
                debug!("Allocated comparison label block {} for '{}'", id, op);
                comparison_operation(comparison, id)
            }
        };
        self.emit(block)
    }
}

/// `y = pop; x = pop; push x OP y`, folded into one SP decrement
fn binary_operation(operator: &str) -> AsmBlock {
    let mut block = AsmBlock::new();
    block
        .pop_d()
        .line("A=A-1")
        .line(format!("M=M{}D", operator));
    block
}

/// Rewrites the top of stack in place
fn unary_operation(operator: &str, placement: Placement) -> AsmBlock {
    let mut block = AsmBlock::new();
    block.at("SP").line("A=M-1");
    match placement {
        Placement::Prefix => block.line(format!("M={}M", operator)),
        Placement::Postfix => block.line(format!("M=M{}", operator)),
    };
    block
}

/// Overflow-safe `x CMP y`, pushing -1 (true) or 0 (false).
///
/// `x - y` is only computed when x and y share a sign class; mixed signs are
/// decided by the decision table in `Comparison::outcome`.
fn comparison_operation(comparison: Comparison, id: usize) -> AsmBlock {
    let labels = ComparisonLabels::new(id);
    let mut block = AsmBlock::new();

    // y into R13, then split on its sign
    block
        .pop_d()
        .at("R13")
        .line("M=D")
        .jump_if_d(&labels.y_negative, "JLT");

    // y >= 0: a negative x decides the result
    block
        .pop_d()
        .jump_if_d(
            labels.target(comparison.outcome(SignCase::XNegativeYNonNegative)),
            "JLT",
        )
        .jump(&labels.difference);

    // y < 0: a non-negative x decides the result
    block
        .label(&labels.y_negative)
        .pop_d()
        .jump_if_d(
            labels.target(comparison.outcome(SignCase::XNonNegativeYNegative)),
            "JGE",
        );

    // Same sign class
    block
        .label(&labels.difference)
        .at("R13")
        .line("D=D-M")
        .jump_if_d(&labels.true_branch, comparison.jump());

    // A is stale after the jumps, so reload SP for the result slot
    block
        .label(&labels.false_branch)
        .at("SP")
        .line("A=M")
        .line("M=0")
        .jump(&labels.end)
        .label(&labels.true_branch)
        .at("SP")
        .line("A=M")
        .line("M=-1")
        .label(&labels.end)
        .at("SP")
        .line("M=M+1");
    block
}
