//! The assembly IR: registers, sized operands, commands and data entries,
//! plus the handful of block-move/write helpers every node generator calls
//! into.
//!
//! Shape grounded in `original_source/generator.h`/`generator.cpp`'s
//! `AsmCode`/`AsmCmd`/`AsmData`/`AsmOperand` hierarchy: a flat list of data
//! entries, a flat list of commands, and a counter-based label generator
//! (`GenLabel`). The class hierarchy is flattened into enums the same way
//! `pascalc-sem`'s `Type`/`SymbolKind` flatten `sym_table.h`'s class tree.
//!
//! This IR only serialises; it performs no validation of its own operands
//! (matching `AsmCode::Print`'s role — the generator above decides what's
//! legal, this module just renders it to text).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    Eax,
    Ebx,
    Ecx,
    Edx,
    Esi,
    Edi,
    Ebp,
    Esp,
    /// Byte sub-registers, used by `setcc`/`movzbl`.
    Al,
    /// Byte sub-register, used only as the implicit shift count of `sal`/`sar`.
    Cl,
    /// Word sub-register, used only as the target of `fnstsw`.
    Ax,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Register::Eax => "%eax",
            Register::Ebx => "%ebx",
            Register::Ecx => "%ecx",
            Register::Edx => "%edx",
            Register::Esi => "%esi",
            Register::Edi => "%edi",
            Register::Ebp => "%ebp",
            Register::Esp => "%esp",
            Register::Al => "%al",
            Register::Cl => "%cl",
            Register::Ax => "%ax",
        };
        f.write_str(s)
    }
}

/// Operand-size suffix, standard GNU-`as` AT&T convention. Only attached to
/// commands whose operands don't already disambiguate size on their own
/// (`fld`/`fstp` always need one; `movzb` always widens to a 32-bit dest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// `b` — one byte.
    Byte,
    /// `s` — 4-byte single-precision float (`flds`/`fstps` only).
    Single,
    /// `l` — 4-byte integer, or (on `fld`/`fstp`) an 8-byte double.
    Long,
}

impl Size {
    fn suffix(self) -> &'static str {
        match self {
            Size::Byte => "b",
            Size::Single => "s",
            Size::Long => "l",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Add,
    Sub,
    And,
    Or,
    Xor,
    Cmp,
    Div,
    Idiv,
    Imul,
    Mul,
    Lea,
    Mov,
    Movzb,
    Not,
    Neg,
    Pop,
    Push,
    Call,
    Ret,
    Jmp,
    Jne,
    Jng,
    Jnl,
    Jz,
    Jnz,
    Sal,
    Sar,
    Setg,
    Setge,
    Setl,
    Setle,
    Sete,
    Setne,
    Test,
    /// x87: load one real onto the FPU stack.
    Fld,
    /// x87: pop the FPU stack into memory.
    Fstp,
    /// x87: convert the top-of-int-stack operand into a float and load it.
    Fild,
    Faddp,
    Fsubp,
    Fmulp,
    Fdivp,
    /// Compare the top two FPU registers, popping both.
    Fcompp,
    /// Store the FPU status word into `%ax`.
    Fnstsw,
    /// Copy `%ah` into the integer flags.
    Sahf,
    /// Negate the top of the FPU stack in place.
    Fchs,
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mnemonic::Add => "add",
            Mnemonic::Sub => "sub",
            Mnemonic::And => "and",
            Mnemonic::Or => "or",
            Mnemonic::Xor => "xor",
            Mnemonic::Cmp => "cmp",
            Mnemonic::Div => "div",
            Mnemonic::Idiv => "idiv",
            Mnemonic::Imul => "imul",
            Mnemonic::Mul => "mul",
            Mnemonic::Lea => "lea",
            Mnemonic::Mov => "mov",
            Mnemonic::Movzb => "movzb",
            Mnemonic::Not => "not",
            Mnemonic::Neg => "neg",
            Mnemonic::Pop => "pop",
            Mnemonic::Push => "push",
            Mnemonic::Call => "call",
            Mnemonic::Ret => "ret",
            Mnemonic::Jmp => "jmp",
            Mnemonic::Jne => "jne",
            Mnemonic::Jng => "jng",
            Mnemonic::Jnl => "jnl",
            Mnemonic::Jz => "jz",
            Mnemonic::Jnz => "jnz",
            Mnemonic::Sal => "sal",
            Mnemonic::Sar => "sar",
            Mnemonic::Setg => "setg",
            Mnemonic::Setge => "setge",
            Mnemonic::Setl => "setl",
            Mnemonic::Setle => "setle",
            Mnemonic::Sete => "sete",
            Mnemonic::Setne => "setne",
            Mnemonic::Test => "test",
            Mnemonic::Fld => "fld",
            Mnemonic::Fstp => "fstp",
            Mnemonic::Fild => "fild",
            Mnemonic::Faddp => "faddp",
            Mnemonic::Fsubp => "fsubp",
            Mnemonic::Fmulp => "fmulp",
            Mnemonic::Fdivp => "fdivp",
            Mnemonic::Fcompp => "fcompp",
            Mnemonic::Fnstsw => "fnstsw",
            Mnemonic::Sahf => "sahf",
            Mnemonic::Fchs => "fchs",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub enum Operand {
    Reg(Register),
    /// `$n` — a bare integer immediate.
    Imm(i64),
    /// `$label` — the address of a label, as an immediate.
    ImmLabel(String),
    /// `label` — a direct memory operand at a label (dereferences it).
    Label(String),
    /// `disp(base)`, or plain `(base)` when `disp == 0`.
    Mem { base: Register, disp: i32 },
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(r) => write!(f, "{r}"),
            Operand::Imm(n) => write!(f, "${n}"),
            Operand::ImmLabel(l) => write!(f, "${l}"),
            Operand::Label(l) => write!(f, "{l}"),
            Operand::Mem { base, disp } => {
                if *disp == 0 {
                    write!(f, "({base})")
                } else {
                    write!(f, "{disp}({base})")
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Label(String),
    Op0(Mnemonic),
    Op1(Mnemonic, Option<Size>, Operand),
    Op2(Mnemonic, Option<Size>, Operand, Operand),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Label(name) => write!(f, "{name}:"),
            Command::Op0(mn) => write!(f, "\t{mn}"),
            Command::Op1(mn, size, op) => {
                let suffix = size.map(Size::suffix).unwrap_or("");
                write!(f, "\t{mn}{suffix}\t{op}")
            }
            Command::Op2(mn, size, a, b) => {
                let suffix = size.map(Size::suffix).unwrap_or("");
                write!(f, "\t{mn}{suffix}\t{a}, {b}")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum DataKind {
    /// `.space n` — zeroed storage for a global variable.
    Space(u32),
    /// `.string "..."` — a Pascal string literal, NUL-terminated.
    Str(String),
    /// `.float n` — a real literal, stored as a single-precision constant.
    Float(f32),
}

#[derive(Debug, Clone)]
pub struct Data {
    pub label: String,
    pub kind: DataKind,
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        match &self.kind {
            DataKind::Space(n) => write!(f, "\t.space\t{n}"),
            DataKind::Str(s) => write!(f, "\t.string\t{:?}", s),
            DataKind::Float(n) => write!(f, "\t.float\t{n}"),
        }
    }
}

/// Accumulates data and text as they're produced and renders the final
/// `.data`/`.text` assembly listing, the way `AsmCode::Print` does.
///
/// Unlike `AsmCode::Print`, this does not append a trailing bare `ret`:
/// every routine (including `main`) emits its own prologue/epilogue with an
/// explicit `ret`, so an extra unconditional one would be dead code after
/// the last routine's own return.
#[derive(Debug, Default)]
pub struct AsmCode {
    data: Vec<Data>,
    text: Vec<Command>,
    label_counter: u32,
    str_counter: u32,
}

impl AsmCode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_label(&mut self, name: impl Into<String>) {
        self.text.push(Command::Label(name.into()));
    }

    pub fn add_cmd0(&mut self, mn: Mnemonic) {
        self.text.push(Command::Op0(mn));
    }

    pub fn add_cmd1(&mut self, mn: Mnemonic, op: Operand) {
        self.text.push(Command::Op1(mn, None, op));
    }

    pub fn add_cmd1_sized(&mut self, mn: Mnemonic, size: Size, op: Operand) {
        self.text.push(Command::Op1(mn, Some(size), op));
    }

    pub fn add_cmd2(&mut self, mn: Mnemonic, a: Operand, b: Operand) {
        self.text.push(Command::Op2(mn, None, a, b));
    }

    pub fn add_cmd2_sized(&mut self, mn: Mnemonic, size: Size, a: Operand, b: Operand) {
        self.text.push(Command::Op2(mn, Some(size), a, b));
    }

    pub fn add_data(&mut self, label: impl Into<String>, kind: DataKind) {
        self.data.push(Data { label: label.into(), kind });
    }

    /// Interns a string literal as a fresh `.string` entry, returning its label.
    pub fn intern_string(&mut self, value: &str) -> String {
        let label = format!("str_{}", self.str_counter);
        self.str_counter += 1;
        self.add_data(label.clone(), DataKind::Str(value.to_string()));
        label
    }

    /// Interns a real literal as a fresh `.float` entry, returning its label.
    pub fn intern_float(&mut self, value: f32) -> String {
        let label = format!("real_{}", self.str_counter);
        self.str_counter += 1;
        self.add_data(label.clone(), DataKind::Float(value));
        label
    }

    /// A fresh `prefix_N` label, unique within this compilation unit.
    pub fn gen_label(&mut self, prefix: &str) -> String {
        let n = self.label_counter;
        self.label_counter += 1;
        format!("{prefix}_{n}")
    }

    pub fn push(&mut self, op: Operand) {
        self.add_cmd1(Mnemonic::Push, op);
    }

    pub fn pop(&mut self, op: Operand) {
        self.add_cmd1(Mnemonic::Pop, op);
    }

    /// Pops an address off the stack and pushes the `size` bytes it points
    /// at, highest dword first, so the lowest-addressed dword of the
    /// pointee ends up on top of the stack (nearest the original base).
    /// Mirrors `AsmCode::PushMemory`.
    pub fn push_memory(&mut self, size: u32) {
        self.pop(Operand::Reg(Register::Ebx));
        let mut i = 0;
        while i < size {
            self.add_cmd2(
                Mnemonic::Mov,
                Operand::Mem { base: Register::Ebx, disp: (size - i - 4) as i32 },
                Operand::Reg(Register::Eax),
            );
            self.push(Operand::Reg(Register::Eax));
            i += 4;
        }
    }

    /// Pops `size` bytes off the stack into the memory the address
    /// underneath them points at. Mirrors `AsmCode::MoveToMemoryFromStack`.
    pub fn move_to_memory_from_stack(&mut self, size: u32) {
        self.pop(Operand::Reg(Register::Ebx));
        let mut i = 0;
        while i < size {
            self.pop(Operand::Reg(Register::Eax));
            self.add_cmd2(
                Mnemonic::Mov,
                Operand::Reg(Register::Eax),
                Operand::Mem { base: Register::Ebx, disp: i as i32 },
            );
            i += 4;
        }
    }

    fn call_write_common(&mut self, fmt_label: &str, arg_bytes: u32) {
        self.push(Operand::ImmLabel(fmt_label.to_string()));
        self.add_cmd1(Mnemonic::Call, Operand::Label("printf".to_string()));
        self.add_cmd2(
            Mnemonic::Add,
            Operand::Imm((arg_bytes + 4) as i64),
            Operand::Reg(Register::Esp),
        );
    }

    /// Expects an integer value already on top of the stack.
    pub fn call_write_for_int(&mut self, fmt_label: &str) {
        self.call_write_common(fmt_label, 4);
    }

    /// Expects a 4-byte float already on top of the stack; widens it to a
    /// double before handing it to `printf`, since varargs floats promote
    /// to `double`. Mirrors `AsmCode::CallWriteForReal`.
    pub fn call_write_for_real(&mut self, fmt_label: &str) {
        self.add_cmd1_sized(Mnemonic::Fld, Size::Single, Operand::Mem { base: Register::Esp, disp: 0 });
        self.add_cmd2(Mnemonic::Sub, Operand::Imm(8), Operand::Reg(Register::Esp));
        self.add_cmd1_sized(Mnemonic::Fstp, Size::Long, Operand::Mem { base: Register::Esp, disp: 4 });
        self.add_cmd2(
            Mnemonic::Mov,
            Operand::ImmLabel(fmt_label.to_string()),
            Operand::Mem { base: Register::Esp, disp: 0 },
        );
        self.add_cmd1(Mnemonic::Call, Operand::Label("printf".to_string()));
        self.add_cmd2(Mnemonic::Add, Operand::Imm(12), Operand::Reg(Register::Esp));
    }

    /// Expects a `char*` value already on top of the stack. The original's
    /// `CallWriteForStr` calls `printf` with only the format string and no
    /// value argument, printing nothing useful; this pushes the value too,
    /// matching the int/real shape.
    pub fn call_write_for_str(&mut self, fmt_label: &str) {
        self.call_write_common(fmt_label, 4);
    }

    /// `printf("\n")` with no value argument, for `writeln`'s trailing newline.
    pub fn call_write_newline(&mut self, fmt_nl_label: &str) {
        self.push(Operand::ImmLabel(fmt_nl_label.to_string()));
        self.add_cmd1(Mnemonic::Call, Operand::Label("printf".to_string()));
        self.add_cmd2(Mnemonic::Add, Operand::Imm(4), Operand::Reg(Register::Esp));
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(".data\n");
        for d in &self.data {
            out.push_str(&d.to_string());
            out.push('\n');
        }
        out.push_str(".text\n");
        out.push_str(".globl main\n");
        for c in &self.text {
            out.push_str(&c.to_string());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_display_matches_att_syntax() {
        assert_eq!(Operand::Reg(Register::Eax).to_string(), "%eax");
        assert_eq!(Operand::Imm(-3).to_string(), "$-3");
        assert_eq!(Operand::ImmLabel("str_0".into()).to_string(), "$str_0");
        assert_eq!(Operand::Label("main".into()).to_string(), "main");
        assert_eq!(
            Operand::Mem { base: Register::Ebp, disp: 0 }.to_string(),
            "(%ebp)"
        );
        assert_eq!(
            Operand::Mem { base: Register::Ebp, disp: -8 }.to_string(),
            "-8(%ebp)"
        );
    }

    #[test]
    fn command_display_adds_size_suffix_only_when_given() {
        let plain = Command::Op2(
            Mnemonic::Mov,
            None,
            Operand::Reg(Register::Eax),
            Operand::Reg(Register::Ebx),
        );
        assert_eq!(plain.to_string(), "\tmov\t%eax, %ebx");

        let sized = Command::Op1(
            Mnemonic::Fstp,
            Some(Size::Long),
            Operand::Mem { base: Register::Esp, disp: 0 },
        );
        assert_eq!(sized.to_string(), "\tfstpl\t(%esp)");
    }

    #[test]
    fn gen_label_is_unique_and_prefixed() {
        let mut code = AsmCode::new();
        assert_eq!(code.gen_label("for_check"), "for_check_0");
        assert_eq!(code.gen_label("for_check"), "for_check_1");
        assert_eq!(code.gen_label("for_fin"), "for_fin_2");
    }

    #[test]
    fn intern_string_and_float_produce_distinct_labels_and_data_entries() {
        let mut code = AsmCode::new();
        let s = code.intern_string("hi");
        let f = code.intern_float(1.5);
        assert_ne!(s, f);
        let rendered = code.render();
        assert!(rendered.contains(&format!("{s}:")));
        assert!(rendered.contains(".string\t\"hi\""));
        assert!(rendered.contains(&format!("{f}:")));
        assert!(rendered.contains(".float\t1.5"));
    }

    #[test]
    fn push_memory_reads_highest_dword_first() {
        let mut code = AsmCode::new();
        code.push_memory(8);
        let rendered = code.render();
        // base pointer popped into %ebx, then the dword at offset 4 loaded
        // before the dword at offset 0, so the low dword ends on top.
        assert!(rendered.contains("\tpop\t%ebx"));
        assert!(rendered.contains("4(%ebx)"));
        assert!(rendered.contains("0(%ebx)") || rendered.contains("(%ebx)"));
    }

    #[test]
    fn render_emits_data_then_text_with_globl_main() {
        let mut code = AsmCode::new();
        code.add_data("g_0", DataKind::Space(4));
        code.add_label("main");
        code.add_cmd0(Mnemonic::Ret);
        let rendered = code.render();
        let data_pos = rendered.find(".data").unwrap();
        let text_pos = rendered.find(".text").unwrap();
        let globl_pos = rendered.find(".globl main").unwrap();
        let label_pos = rendered.find("main:").unwrap();
        assert!(data_pos < text_pos);
        assert!(text_pos < globl_pos);
        assert!(globl_pos < label_pos);
        assert!(!rendered.trim_end().ends_with("ret\nret"));
    }

    #[test]
    fn call_write_for_str_cleans_up_format_and_value_argument() {
        let mut code = AsmCode::new();
        code.call_write_for_str("fmt_str");
        let rendered = code.render();
        assert!(rendered.contains("$fmt_str"));
        assert!(rendered.contains("\tcall\tprintf"));
        // 4 bytes for the format string pointer plus 4 for the value the
        // caller already pushed, unlike the original which drops the value.
        assert!(rendered.contains("add\t$8, %esp"));
    }
}
