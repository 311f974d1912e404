//! Code generation.
//!
//! Emits the flat instruction listing for a fully decorated program. The
//! listing opens with the entry stub (`PushLabel main; Call; Halt`)
//! followed by one block per function.
//!
//! Fresh labels come from a per-compilation counter and are rendered
//! `.L<n>.<purpose>`; the leading dot keeps them disjoint from function
//! labels, which are plain identifiers.

use tauc_par::{
    BinOp, BinaryExpr, CallExpr, CompoundStmt, Expr, FuncDecl, Program, Stmt, UnOp,
};
use tauc_sem::{Bindings, ScopeKind, SymbolId};
use tauc_util::{CompileError, Result, Span};
use tauc_vm::Insn;

use crate::frame::FrameLayout;

/// Generate the instruction listing for a program.
pub fn generate(
    program: &Program,
    bindings: &Bindings,
    frames: &FrameLayout,
) -> Result<Vec<Insn>> {
    let mut gen = CodeGen {
        bindings,
        frames,
        insns: Vec::new(),
        next_label: 0,
    };
    gen.program(program)?;
    Ok(gen.insns)
}

struct CodeGen<'a> {
    bindings: &'a Bindings,
    frames: &'a FrameLayout,
    insns: Vec<Insn>,
    next_label: u32,
}

impl CodeGen<'_> {
    fn emit(&mut self, insn: Insn) {
        self.insns.push(insn);
    }

    fn fresh_label(&mut self, purpose: &str) -> String {
        let n = self.next_label;
        self.next_label += 1;
        format!(".L{n}.{purpose}")
    }

    fn program(&mut self, program: &Program) -> Result<()> {
        self.emit(Insn::PushLabel("main".to_string()));
        self.emit(Insn::Call);
        self.emit(Insn::Halt);
        for func in &program.decls {
            self.func_decl(func)?;
        }
        Ok(())
    }

    fn func_decl(&mut self, func: &FuncDecl) -> Result<()> {
        let size = self.frames.size_of(func)?;
        self.emit(Insn::Label(func.name.name.clone()));

        // Prologue. On entry the caller has reserved the return and
        // argument slots below and `Call` left the return address on the
        // operand stack.
        self.emit(Insn::PushSp(0));
        self.emit(Insn::Swap);
        self.emit(Insn::Store); // return address at *(SP) = new FP + 0
        self.emit(Insn::PushSp(1));
        self.emit(Insn::PushFp(0));
        self.emit(Insn::Store); // caller FP at offset 1
        self.emit(Insn::PushSp(2));
        self.emit(Insn::PushSp(0));
        self.emit(Insn::Store); // caller SP at offset 2
        self.emit(Insn::PushSp(0));
        self.emit(Insn::PopFp); // FP := SP
        self.emit(Insn::PushSp(size));
        self.emit(Insn::PopSp); // SP := FP + size

        self.compound(&func.body)?;
        self.epilogue();
        Ok(())
    }

    /// Restore the caller's SP and FP, then jump to the return address.
    fn epilogue(&mut self) {
        self.emit(Insn::PushFp(0));
        self.emit(Insn::Load);
        self.emit(Insn::PushFp(2));
        self.emit(Insn::Load);
        self.emit(Insn::PopSp);
        self.emit(Insn::PushFp(1));
        self.emit(Insn::Load);
        self.emit(Insn::PopFp);
        self.emit(Insn::JumpIndirect);
    }

    fn compound(&mut self, block: &CompoundStmt) -> Result<()> {
        // Declarations produced no code; their slots were assigned by the
        // frame pass.
        for stmt in &block.stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Compound(block) => self.compound(block),
            Stmt::Assign(s) => {
                self.lval(&s.lhs)?;
                self.rval(&s.rhs)?;
                self.emit(Insn::Store);
                Ok(())
            }
            Stmt::If(s) => {
                let else_label = self.fresh_label("else");
                let exit_label = self.fresh_label("exit");
                self.control(&s.cond, &else_label, false)?;
                self.compound(&s.then_body)?;
                self.emit(Insn::Jump(exit_label.clone()));
                self.emit(Insn::Label(else_label));
                if let Some(body) = &s.else_body {
                    self.compound(body)?;
                }
                self.emit(Insn::Label(exit_label));
                Ok(())
            }
            Stmt::While(s) => {
                let top_label = self.fresh_label("top");
                let exit_label = self.fresh_label("exit");
                self.emit(Insn::Label(top_label.clone()));
                self.control(&s.cond, &exit_label, false)?;
                self.compound(&s.body)?;
                self.emit(Insn::Jump(top_label));
                self.emit(Insn::Label(exit_label));
                Ok(())
            }
            Stmt::Return(s) => {
                if let Some(expr) = &s.expr {
                    self.emit(Insn::PushFp(-1));
                    self.rval(expr)?;
                    self.emit(Insn::Store);
                }
                self.epilogue();
                Ok(())
            }
            Stmt::Call(s) => {
                self.rval_call(&s.call)?;
                self.emit(Insn::Pop); // discard the return value
                Ok(())
            }
            Stmt::Print(s) => {
                self.rval(&s.expr)?;
                self.emit(Insn::Print);
                Ok(())
            }
        }
    }

    /// Push the value of an expression onto the operand stack.
    fn rval(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Id(e) => {
                let symbol = self.bindings.resolution(&e.name)?;
                let offset = self.offset(symbol, e.span)?;
                self.emit(Insn::PushFp(offset));
                self.emit(Insn::Load);
                Ok(())
            }
            Expr::Int(e) => {
                self.emit(Insn::PushImmediate(e.value));
                Ok(())
            }
            Expr::Bool(e) => {
                self.emit(Insn::PushImmediate(i64::from(e.value)));
                Ok(())
            }
            Expr::Call(e) => self.rval_call(e),
            Expr::ArrayCell(_) => {
                self.lval(expr)?;
                self.emit(Insn::Load);
                Ok(())
            }
            Expr::Binary(e) => match e.op {
                BinOp::And | BinOp::Or => self.rval_short_circuit(expr),
                _ => self.rval_binary(e),
            },
            Expr::Unary(e) => {
                self.rval(&e.expr)?;
                self.emit(match e.op {
                    UnOp::Neg => Insn::Negate,
                    UnOp::Not => Insn::Not,
                });
                Ok(())
            }
        }
    }

    fn rval_binary(&mut self, e: &BinaryExpr) -> Result<()> {
        self.rval(&e.left)?;
        self.rval(&e.right)?;
        let insn = match e.op {
            BinOp::Add => Insn::Add,
            BinOp::Sub => Insn::Sub,
            BinOp::Mul => Insn::Mul,
            BinOp::Div => Insn::Div,
            BinOp::Lt => Insn::LessThan,
            BinOp::Le => Insn::LessThanEqual,
            BinOp::Gt => Insn::GreaterThan,
            BinOp::Ge => Insn::GreaterThanEqual,
            BinOp::Eq => Insn::Equal,
            BinOp::Ne => Insn::NotEqual,
            BinOp::And | BinOp::Or => {
                return Err(CompileError::internal(
                    "short-circuit operator reached rval_binary",
                    e.span,
                ))
            }
        };
        self.emit(insn);
        Ok(())
    }

    /// A boolean connective in value position: route through `control`,
    /// pushing 1 on the fall-through (true) path and 0 on the false path.
    fn rval_short_circuit(&mut self, expr: &Expr) -> Result<()> {
        let on_false = self.fresh_label("false");
        let exit_label = self.fresh_label("exit");
        self.control(expr, &on_false, false)?;
        self.emit(Insn::PushImmediate(1));
        self.emit(Insn::Jump(exit_label.clone()));
        self.emit(Insn::Label(on_false));
        self.emit(Insn::PushImmediate(0));
        self.emit(Insn::Label(exit_label));
        Ok(())
    }

    fn rval_call(&mut self, call: &CallExpr) -> Result<()> {
        let argc = call.args.len() as i64;
        // Reserve the return slot and one slot per argument.
        self.emit(Insn::PushSp(1 + argc));
        self.emit(Insn::PopSp);
        for (i, arg) in call.args.iter().enumerate() {
            self.emit(Insn::PushSp(-(i as i64) - 2));
            self.rval(arg)?;
            self.emit(Insn::Store);
        }
        self.lval(&call.callee)?;
        self.emit(Insn::Call);
        // Fetch the return value, then release the reserved slots.
        self.emit(Insn::PushSp(-1));
        self.emit(Insn::Load);
        self.emit(Insn::PushSp(-1 - argc));
        self.emit(Insn::PopSp);
        Ok(())
    }

    /// Push the address of an assignable or callable expression.
    fn lval(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Id(e) => {
                let symbol = self.bindings.resolution(&e.name)?;
                let scope = self.bindings.symbols.get(symbol).scope;
                if self.bindings.scopes.kind(scope) == ScopeKind::Global {
                    // A function: its address is its label.
                    self.emit(Insn::PushLabel(e.name.name.clone()));
                } else {
                    let offset = self.offset(symbol, e.span)?;
                    self.emit(Insn::PushFp(offset));
                }
                Ok(())
            }
            Expr::ArrayCell(e) => {
                self.lval(&e.array)?;
                self.rval(&e.index)?;
                self.emit(Insn::Add);
                Ok(())
            }
            _ => Err(CompileError::internal(
                "expression is not an l-value",
                expr.span(),
            )),
        }
    }

    /// Emit code that transfers to `label` iff `expr` evaluates to
    /// `sense`, leaving nothing on the operand stack.
    fn control(&mut self, expr: &Expr, label: &str, sense: bool) -> Result<()> {
        match expr {
            Expr::Bool(e) => {
                if e.value == sense {
                    self.emit(Insn::Jump(label.to_string()));
                }
                Ok(())
            }
            Expr::Binary(e) if e.op == BinOp::And => {
                if sense {
                    let fall_through = self.fresh_label("exit");
                    self.control(&e.left, &fall_through, false)?;
                    self.control(&e.right, label, true)?;
                    self.emit(Insn::Label(fall_through));
                } else {
                    self.control(&e.left, label, false)?;
                    self.control(&e.right, label, false)?;
                }
                Ok(())
            }
            Expr::Binary(e) if e.op == BinOp::Or => {
                if sense {
                    self.control(&e.left, label, true)?;
                    self.control(&e.right, label, true)?;
                } else {
                    let fall_through = self.fresh_label("exit");
                    self.control(&e.left, &fall_through, true)?;
                    self.control(&e.right, label, false)?;
                    self.emit(Insn::Label(fall_through));
                }
                Ok(())
            }
            Expr::Unary(e) if e.op == UnOp::Not => self.control(&e.expr, label, !sense),
            _ => {
                self.rval(expr)?;
                self.emit(if sense {
                    Insn::JumpIfNotZero(label.to_string())
                } else {
                    Insn::JumpIfZero(label.to_string())
                });
                Ok(())
            }
        }
    }

    fn offset(&self, symbol: SymbolId, span: Span) -> Result<i64> {
        self.bindings.symbols.offset_of(symbol).ok_or_else(|| {
            CompileError::internal("symbol has no frame slot", span)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::assign_frames;
    use tauc_lex::Lexer;
    use tauc_par::Parser;
    use tauc_sem::analyze;
    use tauc_util::FxHashMap;

    fn compile(source: &str) -> Vec<Insn> {
        let program = Parser::parse(Lexer::tokenize(source).expect("scan failed"))
            .expect("parse failed");
        let (mut bindings, _types) = analyze(&program).expect("analysis failed");
        let frames = assign_frames(&program, &mut bindings).expect("frame layout failed");
        generate(&program, &bindings, &frames).expect("codegen failed")
    }

    /// Rewrite fresh `.L` labels to their order of first appearance so
    /// listings can be compared modulo label naming.
    fn normalize_labels(insns: &[Insn]) -> Vec<Insn> {
        let mut names: FxHashMap<String, String> = FxHashMap::default();
        let mut rename = |name: &str| -> String {
            if !name.starts_with(".L") {
                return name.to_string();
            }
            let next = format!(".N{}", names.len());
            names.entry(name.to_string()).or_insert(next).clone()
        };
        insns
            .iter()
            .map(|insn| match insn {
                Insn::PushLabel(l) => Insn::PushLabel(rename(l)),
                Insn::Jump(l) => Insn::Jump(rename(l)),
                Insn::JumpIfZero(l) => Insn::JumpIfZero(rename(l)),
                Insn::JumpIfNotZero(l) => Insn::JumpIfNotZero(rename(l)),
                Insn::Label(l) => Insn::Label(rename(l)),
                other => other.clone(),
            })
            .collect()
    }

    #[test]
    fn test_entry_stub() {
        let insns = compile("func main(): void { }");
        assert_eq!(insns[0], Insn::PushLabel("main".to_string()));
        assert_eq!(insns[1], Insn::Call);
        assert_eq!(insns[2], Insn::Halt);
    }

    #[test]
    fn test_function_prologue_shape() {
        let insns = compile("func main(): void { var x: int }");
        // after the stub: label, then the five prologue groups
        assert_eq!(insns[3], Insn::Label("main".to_string()));
        assert_eq!(
            &insns[4..17],
            &[
                Insn::PushSp(0),
                Insn::Swap,
                Insn::Store,
                Insn::PushSp(1),
                Insn::PushFp(0),
                Insn::Store,
                Insn::PushSp(2),
                Insn::PushSp(0),
                Insn::Store,
                Insn::PushSp(0),
                Insn::PopFp,
                Insn::PushSp(4), // frame size: 3 + one local
                Insn::PopSp,
            ]
        );
    }

    #[test]
    fn test_epilogue_shape() {
        let insns = compile("func main(): void { }");
        assert_eq!(
            &insns[insns.len() - 9..],
            &[
                Insn::PushFp(0),
                Insn::Load,
                Insn::PushFp(2),
                Insn::Load,
                Insn::PopSp,
                Insn::PushFp(1),
                Insn::Load,
                Insn::PopFp,
                Insn::JumpIndirect,
            ]
        );
    }

    #[test]
    fn test_label_uniqueness() {
        let insns = compile(
            "func f(): void { if true { } if false { } while true { } } \
             func main(): void { if true and false or true { } }",
        );
        let mut seen = std::collections::HashSet::new();
        for insn in &insns {
            if let Insn::Label(name) = insn {
                assert!(seen.insert(name.clone()), "duplicate label {name}");
            }
        }
    }

    #[test]
    fn test_assignment_lowering() {
        let insns = compile("func main(): void { var x: int x = 7 }");
        let window = &[Insn::PushFp(3), Insn::PushImmediate(7), Insn::Store];
        assert!(
            insns.windows(3).any(|w| w == window),
            "assignment sequence not found in {insns:?}"
        );
    }

    #[test]
    fn test_return_stores_through_slot_minus_one() {
        let insns = compile("func f(): int { return 42 }");
        let window = &[Insn::PushFp(-1), Insn::PushImmediate(42), Insn::Store];
        assert!(insns.windows(3).any(|w| w == window));
    }

    #[test]
    fn test_call_sequence() {
        let insns = compile(
            "func f(a: int, b: int): int { return a } \
             func main(): void { print f(1, 2) }",
        );
        let expected = [
            Insn::PushSp(3), // return slot + 2 args
            Insn::PopSp,
            Insn::PushSp(-2),
            Insn::PushImmediate(1),
            Insn::Store,
            Insn::PushSp(-3),
            Insn::PushImmediate(2),
            Insn::Store,
            Insn::PushLabel("f".to_string()),
            Insn::Call,
            Insn::PushSp(-1),
            Insn::Load,
            Insn::PushSp(-3),
            Insn::PopSp,
        ];
        assert!(
            insns.windows(expected.len()).any(|w| w == expected),
            "call sequence not found in {insns:?}"
        );
    }

    #[test]
    fn test_call_stmt_discards_return_value() {
        let insns = compile(
            "func f(): int { return 1 } func main(): void { call f() }",
        );
        // the post-call SP release is followed by a Pop
        let window = &[Insn::PushSp(-1), Insn::PopSp, Insn::Pop];
        assert!(insns.windows(3).any(|w| w == window));
    }

    #[test]
    fn test_array_cell_lvalue_is_base_plus_index() {
        let insns = compile("func main(): void { var a: [4] int a[2] = 9 }");
        let window = &[
            Insn::PushFp(3),
            Insn::PushImmediate(2),
            Insn::Add,
            Insn::PushImmediate(9),
            Insn::Store,
        ];
        assert!(
            insns.windows(5).any(|w| w == window),
            "array store not found in {insns:?}"
        );
    }

    #[test]
    fn test_false_and_side_effect_skips_rhs_at_runtime() {
        // control(false and X, L, false) opens with an unconditional jump,
        // so X's code is unreachable.
        let insns = compile(
            "func side(): int { return 1 } \
             func main(): void { if false and side() > 0 { } }",
        );
        let main_at = insns
            .iter()
            .position(|i| *i == Insn::Label("main".to_string()))
            .expect("no main label");
        // first control-flow instruction after main's prologue is the
        // unconditional jump from the false literal
        let jump = insns[main_at..]
            .iter()
            .find(|i| matches!(i, Insn::Jump(_) | Insn::JumpIfZero(_) | Insn::JumpIfNotZero(_)))
            .expect("no jump in main");
        assert!(matches!(jump, Insn::Jump(_)), "expected unconditional jump");
    }

    #[test]
    fn test_control_duality_through_not() {
        // Lowering `if not <cond>` must match lowering `if <cond>` with the
        // branches swapped, modulo fresh-label naming.
        let direct = compile(
            "func f(a: bool, b: bool): void { if a and b { print 1 } else { print 2 } }",
        );
        let negated = compile(
            "func f(a: bool, b: bool): void { if not (a and b) { print 2 } else { print 1 } }",
        );
        // `not` inverts the sense: and-with-sense-false has no interior
        // label, and-with-sense-true has one. The listings differ, but
        // both must contain the same conditional-jump skeleton for the
        // operands.
        let count_cond = |insns: &[Insn]| {
            insns
                .iter()
                .filter(|i| matches!(i, Insn::JumpIfZero(_) | Insn::JumpIfNotZero(_)))
                .count()
        };
        assert_eq!(count_cond(&direct), count_cond(&negated));

        // Exact duality: double negation restores the first listing.
        let double_negated = compile(
            "func f(a: bool, b: bool): void { if not (not (a and b)) { print 1 } else { print 2 } }",
        );
        assert_eq!(normalize_labels(&direct), normalize_labels(&double_negated));
    }

    #[test]
    fn test_while_loop_shape() {
        let insns = compile("func main(): void { var i: int while i < 3 { i = i + 1 } }");
        // Label(top); rval(i<3); JumpIfZero(exit); body; Jump(top); Label(exit)
        let top = insns
            .iter()
            .position(|i| matches!(i, Insn::Label(l) if l.contains("top")))
            .expect("no top label");
        assert!(matches!(&insns[top + 1], Insn::PushFp(3)));
        let exit_jump = insns[top..]
            .iter()
            .find(|i| matches!(i, Insn::JumpIfZero(_)))
            .expect("no exit jump");
        let Insn::JumpIfZero(exit_name) = exit_jump else {
            unreachable!();
        };
        assert!(insns
            .iter()
            .any(|i| matches!(i, Insn::Label(l) if l == exit_name)));
    }

    #[test]
    fn test_deterministic_output() {
        let source = "func fact(n: int): int { if n <= 1 { return 1 } return n * fact(n - 1) } \
                      func main(): void { print fact(5) }";
        assert_eq!(compile(source), compile(source));
    }
}
