//! Node-by-node lowering from the typed AST to the [`crate::asm`] IR.
//!
//! Every expression is generated through a `gen_value`/`addr_of` duality:
//! `gen_value` leaves the expression's value sitting on
//! top of the native stack (one push for scalars, several for aggregates —
//! `syntax_node.cpp`'s block-move helpers), `addr_of` leaves its address in
//! `%eax` without touching the stack pointer (the building block `addr_of`
//! and `gen_lvalue` share, mirroring `NodeArrayAccess`/`NodeRecordAccess`'s
//! own `ComputeIndexToEax` + `GenerateLValue`/`GenerateValue` split).
//!
//! Two gaps in `original_source/syntax_node.cpp` have no counterpart to
//! translate: `NodeBinaryOp::GenerateForReal` is a bare `// TODO`, and
//! `sym_table.cpp` never implements `GenerateValue`/`GenerateLValue` for
//! global/local/param variables. Both are authored from scratch here,
//! grounded in the x87 load/store idiom `NodeIntToRealConv` already uses
//! and the stack-address conventions `pascalc_sem::Scope` already encodes.

use pascalc_par::{BinaryOp, Expr, GlobalVar, Program, Routine, Stmt, UnaryOp, VarRef};
use pascalc_sem::{Symbol, SymbolKind, TypeRef};

use crate::asm::{AsmCode, DataKind, Mnemonic, Operand, Register, Size};

pub struct Generator {
    code: AsmCode,
}

impl Generator {
    fn new() -> Self {
        let mut code = AsmCode::new();
        code.add_data("fmt_int", DataKind::Str("%d".to_string()));
        code.add_data("fmt_real", DataKind::Str("%f".to_string()));
        code.add_data("fmt_str", DataKind::Str("%s".to_string()));
        code.add_data("fmt_nl", DataKind::Str("\n".to_string()));
        Self { code }
    }

    fn gen_program(&mut self, program: &Program) {
        for g in &program.globals {
            self.gen_global(g);
        }
        for routine in &program.routines {
            self.gen_routine(routine);
        }
        self.code.add_label("main");
        self.prologue(0);
        self.gen_stmt(&program.main);
        self.epilogue(0);
    }

    fn gen_global(&mut self, g: &GlobalVar) {
        self.code.add_data(g.label.clone(), DataKind::Space(g.ty.size()));
    }

    fn gen_routine(&mut self, routine: &Routine) {
        self.code.add_label(routine.label.clone());
        self.prologue(routine.sig.scope.locals_size);
        self.gen_stmt(&routine.body);
        self.epilogue(routine.sig.callee_pop_bytes());
    }

    fn prologue(&mut self, locals_size: u32) {
        self.code.push(Operand::Reg(Register::Ebp));
        self.code.add_cmd2(Mnemonic::Mov, Operand::Reg(Register::Esp), Operand::Reg(Register::Ebp));
        if locals_size > 0 {
            self.code.add_cmd2(Mnemonic::Sub, Operand::Imm(locals_size as i64), Operand::Reg(Register::Esp));
        }
    }

    fn epilogue(&mut self, pop_bytes: u32) {
        self.code.add_cmd2(Mnemonic::Mov, Operand::Reg(Register::Ebp), Operand::Reg(Register::Esp));
        self.code.pop(Operand::Reg(Register::Ebp));
        if pop_bytes > 0 {
            self.code.add_cmd1(Mnemonic::Ret, Operand::Imm(pop_bytes as i64));
        } else {
            self.code.add_cmd0(Mnemonic::Ret);
        }
    }

    // ---- statements --------------------------------------------------

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { lhs, rhs, .. } => {
                let size = lhs.ty().size();
                self.gen_value(rhs);
                self.gen_lvalue(lhs);
                self.code.move_to_memory_from_stack(size);
            }
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.gen_stmt(s);
                }
            }
            Stmt::ExprStmt(e) => self.gen_expr_stmt(e),
            Stmt::For { var_ref, from, to, downto, body, .. } => self.gen_for(var_ref, from, to, *downto, body),
            Stmt::While { cond, body, .. } => self.gen_while(cond, body),
            Stmt::RepeatUntil { body, cond, .. } => self.gen_repeat(body, cond),
            Stmt::If { cond, then_branch, else_branch, .. } => self.gen_if(cond, then_branch, else_branch.as_deref()),
        }
    }

    fn gen_expr_stmt(&mut self, e: &Expr) {
        if let Expr::Write { args, newline, .. } = e {
            self.gen_write(args, *newline);
            return;
        }
        self.gen_value(e);
        let size = e.ty().size();
        if size > 0 {
            self.code.add_cmd2(Mnemonic::Add, Operand::Imm(size as i64), Operand::Reg(Register::Esp));
        }
    }

    /// `var := from; goto check; start: body; var := var +/- 1; check: cmp
    /// var,to; jcc start`, so the condition is tested once per iteration
    /// rather than twice. Distinct label prefixes throughout —
    /// `original_source`'s `StmtFor::Generate` reuses `"for_check"` for both
    /// its start and check labels, which is almost certainly a copy-paste
    /// slip rather than intentional aliasing.
    ///
    /// The back-edge condition (`to` loops jump on `jnl`, `downto` loops on
    /// `jng`) matches `original_source`'s own choice of mnemonic exactly;
    /// getting the same mnemonics out of our `cmp` requires comparing
    /// `var, to` (flags = `to - var`) rather than `to, var`, since our pop
    /// order puts `var` in `%ebx` and `to` in `%eax`.
    fn gen_for(&mut self, var: &VarRef, from: &Expr, to: &Expr, downto: bool, body: &Stmt) {
        self.gen_value(from);
        self.gen_lvalue_var(var);
        self.code.move_to_memory_from_stack(4);

        let start = self.code.gen_label("for_start");
        let check = self.code.gen_label("for_check");
        let fin = self.code.gen_label("for_fin");

        self.code.add_cmd1(Mnemonic::Jmp, Operand::Label(check.clone()));
        self.code.add_label(start.clone());
        self.gen_stmt(body);

        self.gen_value_var(var);
        self.code.pop(Operand::Reg(Register::Eax));
        let step = if downto { Mnemonic::Sub } else { Mnemonic::Add };
        self.code.add_cmd2(step, Operand::Imm(1), Operand::Reg(Register::Eax));
        self.code.push(Operand::Reg(Register::Eax));
        self.gen_lvalue_var(var);
        self.code.move_to_memory_from_stack(4);

        self.code.add_label(check);
        self.gen_value(to);
        self.gen_value_var(var);
        self.code.pop(Operand::Reg(Register::Ebx)); // var
        self.code.pop(Operand::Reg(Register::Eax)); // to
        self.code.add_cmd2(Mnemonic::Cmp, Operand::Reg(Register::Ebx), Operand::Reg(Register::Eax));
        let jcc = if downto { Mnemonic::Jng } else { Mnemonic::Jnl };
        self.code.add_cmd1(jcc, Operand::Label(start));
        self.code.add_label(fin);
    }

    fn gen_while(&mut self, cond: &Expr, body: &Stmt) {
        let check = self.code.gen_label("while_check");
        let start = self.code.gen_label("while_start");
        let fin = self.code.gen_label("while_fin");
        self.code.add_cmd1(Mnemonic::Jmp, Operand::Label(check.clone()));
        self.code.add_label(start.clone());
        self.gen_stmt(body);
        self.code.add_label(check);
        self.gen_value(cond);
        self.code.pop(Operand::Reg(Register::Eax));
        self.code.add_cmd2(Mnemonic::Test, Operand::Reg(Register::Eax), Operand::Reg(Register::Eax));
        self.code.add_cmd1(Mnemonic::Jnz, Operand::Label(start));
        self.code.add_label(fin);
    }

    fn gen_repeat(&mut self, body: &Stmt, cond: &Expr) {
        let start = self.code.gen_label("repeat_start");
        self.code.add_label(start.clone());
        self.gen_stmt(body);
        self.gen_value(cond);
        self.code.pop(Operand::Reg(Register::Eax));
        self.code.add_cmd2(Mnemonic::Test, Operand::Reg(Register::Eax), Operand::Reg(Register::Eax));
        self.code.add_cmd1(Mnemonic::Jz, Operand::Label(start));
    }

    /// Keeps `original_source`'s redundant trailing `jmp fin` after the
    /// `then` branch even when there's no `else` (see DESIGN.md).
    fn gen_if(&mut self, cond: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) {
        self.gen_value(cond);
        self.code.pop(Operand::Reg(Register::Eax));
        self.code.add_cmd2(Mnemonic::Test, Operand::Reg(Register::Eax), Operand::Reg(Register::Eax));
        let else_label = self.code.gen_label("if_else");
        let fin_label = self.code.gen_label("if_fin");
        self.code.add_cmd1(Mnemonic::Jz, Operand::Label(else_label.clone()));
        self.gen_stmt(then_branch);
        self.code.add_cmd1(Mnemonic::Jmp, Operand::Label(fin_label.clone()));
        self.code.add_label(else_label);
        if let Some(e) = else_branch {
            self.gen_stmt(e);
        }
        self.code.add_label(fin_label);
    }

    fn gen_write(&mut self, args: &[Expr], newline: bool) {
        for arg in args {
            if arg.ty().is_real() {
                self.gen_value(arg);
                self.code.call_write_for_real("fmt_real");
            } else if matches!(arg, Expr::StringConst { .. }) {
                self.gen_value(arg);
                self.code.call_write_for_str("fmt_str");
            } else {
                self.gen_value(arg);
                self.code.call_write_for_int("fmt_int");
            }
        }
        if newline {
            self.code.call_write_newline("fmt_nl");
        }
    }

    // ---- variable addressing ------------------------------------------

    /// Leaves `var`'s address in `%eax`, without touching the stack.
    fn addr_of_var(&mut self, var: &VarRef) {
        match var {
            VarRef::Global { label, .. } => {
                self.code.add_cmd2(Mnemonic::Mov, Operand::ImmLabel(label.clone()), Operand::Reg(Register::Eax));
            }
            VarRef::Local { offset, .. } => {
                let disp = -((*offset as i32) + 4);
                self.code.add_cmd2(Mnemonic::Lea, Operand::Mem { base: Register::Ebp, disp }, Operand::Reg(Register::Eax));
            }
            VarRef::Param { offset, by_ref: false, .. } => {
                self.code.add_cmd2(
                    Mnemonic::Lea,
                    Operand::Mem { base: Register::Ebp, disp: *offset as i32 },
                    Operand::Reg(Register::Eax),
                );
            }
            VarRef::Param { offset, by_ref: true, .. } => {
                self.code.add_cmd2(
                    Mnemonic::Mov,
                    Operand::Mem { base: Register::Ebp, disp: *offset as i32 },
                    Operand::Reg(Register::Eax),
                );
            }
        }
    }

    fn gen_lvalue_var(&mut self, var: &VarRef) {
        self.addr_of_var(var);
        self.code.push(Operand::Reg(Register::Eax));
    }

    /// Direct-memory-operand shortcut for scalars, falling back to
    /// address-then-`push_memory` for aggregates — exactly the split
    /// `NodeArrayAccess::GenerateValue` uses for `size == 4`.
    fn gen_value_var(&mut self, var: &VarRef) {
        let size = var.ty().size();
        match var {
            VarRef::Global { label, .. } if size == 4 => {
                self.code.push(Operand::Label(label.clone()));
            }
            VarRef::Local { offset, .. } if size == 4 => {
                let disp = -((*offset as i32) + 4);
                self.code.push(Operand::Mem { base: Register::Ebp, disp });
            }
            VarRef::Param { offset, by_ref: false, .. } if size == 4 => {
                self.code.push(Operand::Mem { base: Register::Ebp, disp: *offset as i32 });
            }
            VarRef::Param { offset, by_ref: true, .. } if size == 4 => {
                self.code.add_cmd2(
                    Mnemonic::Mov,
                    Operand::Mem { base: Register::Ebp, disp: *offset as i32 },
                    Operand::Reg(Register::Eax),
                );
                self.code.push(Operand::Mem { base: Register::Eax, disp: 0 });
            }
            _ => {
                self.gen_lvalue_var(var);
                self.code.push_memory(size);
            }
        }
    }

    // ---- l-values -------------------------------------------------------

    /// Leaves `expr`'s address in `%eax`. Grounded in
    /// `NodeArrayAccess::ComputeIndexToEax` (index arithmetic) and
    /// `NodeRecordAccess::GenerateLValue` (field offset via `lea`).
    fn addr_of(&mut self, expr: &Expr) {
        match expr {
            Expr::Var { var, .. } => self.addr_of_var(var),
            Expr::Index { base, index, low, ty, .. } => {
                self.addr_of(base);
                self.code.push(Operand::Reg(Register::Eax));
                self.gen_value(index);
                self.code.add_cmd2(Mnemonic::Mov, Operand::Imm(ty.size() as i64), Operand::Reg(Register::Ebx));
                self.code.pop(Operand::Reg(Register::Eax));
                self.code.add_cmd2(Mnemonic::Sub, Operand::Imm(*low as i64), Operand::Reg(Register::Eax));
                self.code.add_cmd2(Mnemonic::Xor, Operand::Reg(Register::Edx), Operand::Reg(Register::Edx));
                self.code.add_cmd1(Mnemonic::Mul, Operand::Reg(Register::Ebx));
                self.code.pop(Operand::Reg(Register::Ebx));
                self.code.add_cmd2(Mnemonic::Add, Operand::Reg(Register::Ebx), Operand::Reg(Register::Eax));
            }
            Expr::Field { base, offset, .. } => {
                self.addr_of(base);
                self.code.add_cmd2(
                    Mnemonic::Lea,
                    Operand::Mem { base: Register::Eax, disp: *offset as i32 },
                    Operand::Reg(Register::Eax),
                );
            }
            _ => unreachable!("addr_of is only called on l-value expressions"),
        }
    }

    fn gen_lvalue(&mut self, expr: &Expr) {
        self.addr_of(expr);
        self.code.push(Operand::Reg(Register::Eax));
    }

    // ---- values -----------------------------------------------------------

    fn gen_value(&mut self, expr: &Expr) {
        match expr {
            Expr::IntConst { value, .. } => self.code.push(Operand::Imm(*value)),
            Expr::RealConst { value, .. } => {
                let label = self.code.intern_float(*value as f32);
                self.code.push(Operand::Label(label));
            }
            Expr::StringConst { value, .. } => {
                let label = self.code.intern_string(value);
                self.code.push(Operand::ImmLabel(label));
            }
            Expr::Var { var, .. } => self.gen_value_var(var),
            Expr::Unary { op, operand, ty, .. } => self.gen_unary(*op, operand, ty),
            Expr::Binary { op, lhs, rhs, .. } => self.gen_binary(*op, lhs, rhs),
            Expr::IntToReal { operand, .. } => {
                self.gen_value(operand);
                self.code.add_cmd1_sized(Mnemonic::Fild, Size::Long, Operand::Mem { base: Register::Esp, disp: 0 });
                self.code.add_cmd1_sized(Mnemonic::Fstp, Size::Single, Operand::Mem { base: Register::Esp, disp: 0 });
            }
            Expr::Index { ty, .. } if ty.size() == 4 => {
                self.addr_of(expr);
                self.code.push(Operand::Mem { base: Register::Eax, disp: 0 });
            }
            Expr::Index { ty, .. } => {
                self.gen_lvalue(expr);
                self.code.push_memory(ty.size());
            }
            // `NodeRecordAccess::GenerateValue` always goes through
            // `PushMemory`, with no `size == 4` shortcut.
            Expr::Field { ty, .. } => {
                self.gen_lvalue(expr);
                self.code.push_memory(ty.size());
            }
            Expr::Call { .. } => self.gen_call(expr),
            Expr::Write { .. } => unreachable!("write only ever appears as a statement"),
        }
    }

    fn gen_unary(&mut self, op: UnaryOp, operand: &Expr, ty: &TypeRef) {
        match op {
            UnaryOp::Plus => self.gen_value(operand),
            UnaryOp::Neg if ty.is_real() => {
                self.gen_value(operand);
                self.code.add_cmd1_sized(Mnemonic::Fld, Size::Single, Operand::Mem { base: Register::Esp, disp: 0 });
                self.code.add_cmd0(Mnemonic::Fchs);
                self.code.add_cmd1_sized(Mnemonic::Fstp, Size::Single, Operand::Mem { base: Register::Esp, disp: 0 });
            }
            UnaryOp::Neg => {
                self.gen_value(operand);
                self.code.pop(Operand::Reg(Register::Eax));
                self.code.add_cmd1(Mnemonic::Neg, Operand::Reg(Register::Eax));
                self.code.push(Operand::Reg(Register::Eax));
            }
            UnaryOp::Not => {
                self.gen_value(operand);
                self.code.pop(Operand::Reg(Register::Eax));
                self.code.add_cmd2(Mnemonic::Xor, Operand::Imm(1), Operand::Reg(Register::Eax));
                self.code.push(Operand::Reg(Register::Eax));
            }
        }
    }

    fn gen_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) {
        if lhs.ty().is_real() {
            self.gen_binary_real(op, lhs, rhs);
        } else {
            self.gen_binary_int(op, lhs, rhs);
        }
    }

    /// Full int switch grounded in `NodeBinaryOp::GenerateForInt`: eager
    /// `eax = rhs`, `ebx = lhs` after both are pushed, then one mnemonic
    /// sequence per operator. Relational ops share the same `cmp %eax,%ebx`
    /// (flags = lhs - rhs) that `FinGenForRelationalOp` uses.
    fn gen_binary_int(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) {
        self.gen_value(lhs);
        self.gen_value(rhs);
        self.code.pop(Operand::Reg(Register::Eax)); // rhs
        self.code.pop(Operand::Reg(Register::Ebx)); // lhs
        match op {
            BinaryOp::Add => {
                self.code.add_cmd2(Mnemonic::Add, Operand::Reg(Register::Eax), Operand::Reg(Register::Ebx));
                self.code.push(Operand::Reg(Register::Ebx));
            }
            BinaryOp::Sub => {
                self.code.add_cmd2(Mnemonic::Sub, Operand::Reg(Register::Eax), Operand::Reg(Register::Ebx));
                self.code.push(Operand::Reg(Register::Ebx));
            }
            BinaryOp::Mul => {
                self.code.add_cmd2(Mnemonic::Xor, Operand::Reg(Register::Edx), Operand::Reg(Register::Edx));
                self.code.add_cmd1(Mnemonic::Imul, Operand::Reg(Register::Ebx));
                self.code.push(Operand::Reg(Register::Eax));
            }
            BinaryOp::Div => {
                self.code.add_cmd2(Mnemonic::Mov, Operand::Reg(Register::Eax), Operand::Reg(Register::Ecx));
                self.code.add_cmd2(Mnemonic::Mov, Operand::Reg(Register::Ebx), Operand::Reg(Register::Eax));
                self.code.add_cmd2(Mnemonic::Xor, Operand::Reg(Register::Edx), Operand::Reg(Register::Edx));
                self.code.add_cmd1(Mnemonic::Idiv, Operand::Reg(Register::Ecx));
                self.code.push(Operand::Reg(Register::Eax));
            }
            BinaryOp::Mod => {
                self.code.add_cmd2(Mnemonic::Mov, Operand::Reg(Register::Eax), Operand::Reg(Register::Ecx));
                self.code.add_cmd2(Mnemonic::Mov, Operand::Reg(Register::Ebx), Operand::Reg(Register::Eax));
                self.code.add_cmd2(Mnemonic::Xor, Operand::Reg(Register::Edx), Operand::Reg(Register::Edx));
                self.code.add_cmd1(Mnemonic::Idiv, Operand::Reg(Register::Ecx));
                self.code.push(Operand::Reg(Register::Edx));
            }
            BinaryOp::And => {
                self.code.add_cmd2(Mnemonic::And, Operand::Reg(Register::Eax), Operand::Reg(Register::Ebx));
                self.code.push(Operand::Reg(Register::Ebx));
            }
            BinaryOp::Or => {
                self.code.add_cmd2(Mnemonic::Or, Operand::Reg(Register::Eax), Operand::Reg(Register::Ebx));
                self.code.push(Operand::Reg(Register::Ebx));
            }
            BinaryOp::Xor => {
                self.code.add_cmd2(Mnemonic::Xor, Operand::Reg(Register::Eax), Operand::Reg(Register::Ebx));
                self.code.push(Operand::Reg(Register::Ebx));
            }
            BinaryOp::Shl => {
                self.code.add_cmd2(Mnemonic::Mov, Operand::Reg(Register::Eax), Operand::Reg(Register::Ecx));
                self.code.add_cmd2(Mnemonic::Sal, Operand::Reg(Register::Cl), Operand::Reg(Register::Ebx));
                self.code.push(Operand::Reg(Register::Ebx));
            }
            BinaryOp::Shr => {
                self.code.add_cmd2(Mnemonic::Mov, Operand::Reg(Register::Eax), Operand::Reg(Register::Ecx));
                self.code.add_cmd2(Mnemonic::Sar, Operand::Reg(Register::Cl), Operand::Reg(Register::Ebx));
                self.code.push(Operand::Reg(Register::Ebx));
            }
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                self.code.add_cmd2(Mnemonic::Cmp, Operand::Reg(Register::Eax), Operand::Reg(Register::Ebx));
                self.code.add_cmd1(setcc_for(op), Operand::Reg(Register::Al));
                self.code.add_cmd2_sized(
                    Mnemonic::Movzb,
                    Size::Long,
                    Operand::Reg(Register::Al),
                    Operand::Reg(Register::Eax),
                );
                self.code.push(Operand::Reg(Register::Eax));
            }
            BinaryOp::FDiv => unreachable!("FDiv always forces both operands to real"),
        }
    }

    /// `NodeBinaryOp::GenerateForReal` is left as `// TODO` upstream; this
    /// is authored from the x87 load/combine/store idiom `NodeIntToRealConv`
    /// already establishes. Arithmetic loads both operands and combines them
    /// with the paired `f*p` form (pops one FPU register, leaves the result
    /// in the other); comparisons load them in the opposite order so
    /// `fcompp`'s implicit `%st - %st(1)` matches `lhs - rhs`.
    fn gen_binary_real(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::FDiv => {
                self.gen_value(lhs);
                self.gen_value(rhs);
                self.code.add_cmd1_sized(Mnemonic::Fld, Size::Single, Operand::Mem { base: Register::Esp, disp: 4 });
                self.code.add_cmd1_sized(Mnemonic::Fld, Size::Single, Operand::Mem { base: Register::Esp, disp: 0 });
                let fop = match op {
                    BinaryOp::Add => Mnemonic::Faddp,
                    BinaryOp::Sub => Mnemonic::Fsubp,
                    BinaryOp::Mul => Mnemonic::Fmulp,
                    BinaryOp::FDiv => Mnemonic::Fdivp,
                    _ => unreachable!(),
                };
                self.code.add_cmd0(fop);
                self.code.add_cmd2(Mnemonic::Add, Operand::Imm(4), Operand::Reg(Register::Esp));
                self.code.add_cmd1_sized(Mnemonic::Fstp, Size::Single, Operand::Mem { base: Register::Esp, disp: 0 });
            }
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                self.gen_value(lhs);
                self.gen_value(rhs);
                self.code.add_cmd1_sized(Mnemonic::Fld, Size::Single, Operand::Mem { base: Register::Esp, disp: 0 }); // ST0 = rhs
                self.code.add_cmd1_sized(Mnemonic::Fld, Size::Single, Operand::Mem { base: Register::Esp, disp: 4 }); // ST0 = lhs, ST1 = rhs
                self.code.add_cmd0(Mnemonic::Fcompp);
                self.code.add_cmd1(Mnemonic::Fnstsw, Operand::Reg(Register::Ax));
                self.code.add_cmd0(Mnemonic::Sahf);
                self.code.add_cmd1(setcc_for(op), Operand::Reg(Register::Al));
                self.code.add_cmd2_sized(
                    Mnemonic::Movzb,
                    Size::Long,
                    Operand::Reg(Register::Al),
                    Operand::Reg(Register::Eax),
                );
                self.code.add_cmd2(Mnemonic::Add, Operand::Imm(8), Operand::Reg(Register::Esp));
                self.code.push(Operand::Reg(Register::Eax));
            }
            _ => unreachable!("div/mod/shifts/bitwise ops are integer-only"),
        }
    }

    fn gen_call(&mut self, expr: &Expr) {
        let Expr::Call { routine, args, .. } = expr else {
            unreachable!("gen_call is only called on Expr::Call");
        };
        let result_size = routine.sig.result.as_ref().map(|t| t.size()).unwrap_or(0);
        if result_size > 0 {
            self.code.add_cmd2(Mnemonic::Sub, Operand::Imm(result_size as i64), Operand::Reg(Register::Esp));
        }
        // declared params come first, in order, followed by the phantom
        // `result` slot and (for functions) its alias to the routine's own
        // name; `param_count` is exactly the former.
        let formals: Vec<&Symbol> = routine
            .sig
            .scope
            .iter()
            .filter(|s| matches!(s.kind, SymbolKind::Param { .. }))
            .take(routine.sig.param_count)
            .collect();
        for (formal, arg) in formals.iter().zip(args.iter()).rev() {
            match &formal.kind {
                SymbolKind::Param { by_ref: true, .. } => self.gen_lvalue(arg),
                SymbolKind::Param { by_ref: false, .. } => self.gen_value(arg),
                _ => unreachable!("formals are filtered to Param symbols"),
            }
        }
        self.code.add_cmd1(Mnemonic::Call, Operand::Label(routine.label.clone()));
    }
}

fn setcc_for(op: BinaryOp) -> Mnemonic {
    match op {
        BinaryOp::Eq => Mnemonic::Sete,
        BinaryOp::Ne => Mnemonic::Setne,
        BinaryOp::Lt => Mnemonic::Setl,
        BinaryOp::Gt => Mnemonic::Setg,
        BinaryOp::Le => Mnemonic::Setle,
        BinaryOp::Ge => Mnemonic::Setge,
        _ => unreachable!("setcc_for is only called on relational operators"),
    }
}

/// Lowers a whole compilation unit to an AT&T-syntax assembly listing.
pub fn generate(program: &Program) -> String {
    let mut g = Generator::new();
    g.gen_program(program);
    g.code.render()
}

#[cfg(test)]
mod tests {
    fn compile(source: &str) -> String {
        let program = pascalc_par::parse(source).expect("source should parse");
        generate(&program)
    }

    use super::generate;

    #[test]
    fn empty_program_still_prologues_and_returns_from_main() {
        let asm = compile("program p;\nbegin\nend.");
        assert!(asm.contains("main:"));
        assert!(asm.contains("\tpop\t%ebp"));
        assert!(asm.trim_end().ends_with("ret"));
    }

    #[test]
    fn global_variables_get_space_in_the_data_section() {
        let asm = compile("program p;\nvar a,b:integer;\nbegin\nend.");
        let data_section = asm.split(".text").next().unwrap();
        assert_eq!(data_section.matches(".space\t4").count(), 2);
    }

    #[test]
    fn routines_are_emitted_before_main_and_called_by_label() {
        let asm = compile(concat!(
            "program p;\n",
            "procedure hello;\n",
            "begin\n",
            "end;\n",
            "begin\n",
            "  hello;\n",
            "end."
        ));
        let routine_pos = asm.find("hello").expect("routine label should appear");
        let main_pos = asm.find("main:").expect("main label should appear");
        assert!(routine_pos < main_pos);
        assert!(asm.contains("\tcall\thello"));
    }

    #[test]
    fn by_value_function_result_uses_ret_with_callee_pop() {
        let asm = compile(concat!(
            "program p;\n",
            "function sq(n:integer):integer;\n",
            "begin\n",
            "  sq:=n*n;\n",
            "end;\n",
            "begin\n",
            "  sq(3);\n",
            "end."
        ));
        assert!(asm.contains("\timul\t%ebx"));
        assert!(asm.contains("\tret\t$"));
    }

    #[test]
    fn if_without_else_skips_the_then_branch_on_false() {
        let asm = compile(concat!(
            "program p;\n",
            "var a:integer;\n",
            "begin\n",
            "  if a > 0 then a:=1;\n",
            "end."
        ));
        assert!(asm.contains("\tsetg\t%al"));
        assert!(asm.contains("\tjz\t") || asm.contains("\tjnz\t"));
    }

    #[test]
    fn while_loop_checks_condition_before_the_body() {
        let asm = compile(concat!(
            "program p;\n",
            "var i:integer;\n",
            "begin\n",
            "  while i < 10 do i:=i+1;\n",
            "end."
        ));
        // the condition is evaluated, then an unconditional jump into the
        // check is taken before the body ever runs the first time.
        assert!(asm.contains("\tjmp\t"));
        assert!(asm.contains("\tcmp\t"));
    }

    #[test]
    fn writeln_appends_a_trailing_newline_call() {
        let asm = compile(concat!(
            "program p;\n",
            "var a:integer;\n",
            "begin\n",
            "  writeln(a);\n",
            "end."
        ));
        assert!(asm.contains("$fmt_int"));
        assert!(asm.contains("$fmt_nl"));
        assert_eq!(asm.matches("\tcall\tprintf").count(), 2);
    }

    #[test]
    fn write_without_ln_calls_printf_exactly_once() {
        let asm = compile(concat!(
            "program p;\n",
            "var a:integer;\n",
            "begin\n",
            "  write(a);\n",
            "end."
        ));
        assert_eq!(asm.matches("\tcall\tprintf").count(), 1);
    }

    #[test]
    fn real_arithmetic_goes_through_the_fpu() {
        let asm = compile(concat!(
            "program p;\n",
            "var a,b:real;\n",
            "begin\n",
            "  a:=b+1.5;\n",
            "end."
        ));
        assert!(asm.contains("\tfld"));
        assert!(asm.contains("\tfaddp"));
    }
}
