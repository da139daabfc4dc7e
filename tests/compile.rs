use tinygpu_asm::{compile, CompiledEntry, EncodeError, Outcome, StructuralError};

fn words(entries: &[CompiledEntry]) -> Vec<Option<u16>> {
    entries.iter().map(CompiledEntry::word).collect()
}

#[test]
fn three_line_program() {
    let c = compile("CONST R1, #5\nADD R2, R1, R1\nRET\n").unwrap();
    assert_eq!(c.entries.len(), 3);
    assert_eq!(
        words(&c.entries),
        vec![Some(0b1001000100000101), Some(0b0011001000010001), Some(0b1111000000000000)]
    );
    let addrs: Vec<usize> = c.entries.iter().map(|e| e.address).collect();
    assert_eq!(addrs, vec![0, 1, 2]);
    assert_eq!(c.entries[1].text, "ADD R2, R1, R1");
}

#[test]
fn one_entry_per_instruction_even_with_errors() {
    let src = "NOP\nFOO R1\nCONST R1, #300\nADD R1, R2\nRET";
    let c = compile(src).unwrap();
    assert_eq!(c.entries.len(), c.instructions.len());
    assert_eq!(c.diagnostics().len(), 3);
    assert!(c.entries[0].is_ok());
    assert!(c.entries[4].is_ok());
}

#[test]
fn label_addresses_ignore_blanks_and_comments() {
    let src = "\n; prologue\n\nCONST R1, #1\n\n   ; spacer\nTARGET:\n\n; more\n  NOP\nBRnzp TARGET\n";
    let c = compile(src).unwrap();
    assert_eq!(c.symbols.get("TARGET"), Some(1));
    assert_eq!(c.instructions, vec!["CONST R1, #1", "NOP", "BRnzp TARGET"]);
    assert_eq!(c.entries[2].word(), Some(0b0001_1110_0000_0001));
}

#[test]
fn forward_branch_is_absolute() {
    let src = "BRz START\nNOP\nSTART:\nRET";
    let c = compile(src).unwrap();
    let w = c.entries[0].word().unwrap();
    assert_eq!(w & 0xFF, 0b0000_0010);
    assert_eq!(w, 0b0001_0100_0000_0010);
}

#[test]
fn duplicate_label_aborts() {
    let src = "L:\nNOP\nL:\nRET";
    assert_eq!(compile(src).unwrap_err(), StructuralError::DuplicateLabel { label: "L".into() });
}

#[test]
fn undefined_label_is_local() {
    let src = "CONST R1, #1\nBRz MISSING\nADD R2, R1, R1\nRET";
    let c = compile(src).unwrap();
    let diags = c.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].address, 1);
    assert_eq!(diags[0].text, "BRz MISSING");
    assert_eq!(diags[0].error, EncodeError::UndefinedLabel("MISSING".into()));
    assert!(diags[0].to_string().contains("MISSING"));
    assert_eq!(c.entries.iter().filter(|e| e.is_ok()).count(), 3);
}

#[test]
fn trailing_label_dangles_past_end() {
    let src = "BRn END\nNOP\nEND:";
    let c = compile(src).unwrap();
    assert_eq!(c.symbols.get("END"), Some(2));
    assert_eq!(c.entries[0].word(), Some(0b0001_1000_0000_0010));
}

#[test]
fn empty_source() {
    let c = compile("  \n; nothing\n").unwrap();
    assert!(c.entries.is_empty());
    assert_eq!(c.into_words(), Ok(vec![]));
}

#[test]
fn strict_escalation() {
    let ok = compile("NOP\nRET").unwrap();
    assert_eq!(ok.into_words(), Ok(vec![0x0000, 0xF000]));

    let bad = compile("NOP\nRET R1").unwrap();
    assert!(bad.has_errors());
    let diags = bad.into_words().unwrap_err();
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags[0].error,
        EncodeError::OperandCount { mnemonic: "RET".into(), expected: 0, found: 1 }
    );
}

#[test]
fn into_parts_pairs_entries_with_source() {
    let (entries, instrs) = compile("X:\nNOP\nBR X").unwrap().into_parts();
    assert_eq!(instrs, vec!["NOP", "BR X"]);
    assert_eq!(entries[1].outcome, Outcome::Word(0b0001_0000_0000_0000));
}

#[test]
fn label_and_instruction_on_one_line_is_not_a_label() {
    let c = compile("LOOP: NOP").unwrap();
    assert!(c.symbols.is_empty());
    assert_eq!(c.entries[0].outcome, Outcome::Error(EncodeError::UnknownMnemonic("LOOP:".into())));
}

// Reference 2x2 determinant kernel.
const DET_KERNEL: &str = "
; ===== determinant of 2x2 matrix =====
MUL R0, %blockIdx, %blockDim
ADD R0, R0, %threadIdx          ; R0 = global thread id

CONST R1, #0                    ; baseA
CONST R2, #8                    ; baseDet

CONST R14, #0
CONST R15, #1

CMP R0, R14
BRn COMPUTE_DET
BRn END

COMPUTE_DET:
  ADD R3, R1, R14
  LDR R4, R3
  ADD R3, R1, R15
  LDR R5, R3
  CONST R6, #2
  ADD R3, R1, R6
  LDR R7, R3
  CONST R8, #3
  ADD R3, R1, R8
  LDR R9, R3
  CONST R10, #0
  CONST R11, #1

LOOP:
    MUL R12, R4, R9
    MUL R13, R5, R7
    SUB R12, R12, R13
    STR R2, R12
    ADD R10, R10, R15
    CMP R10, R11
    BRn LOOP

END:
  ; thread naturally finishes here
";

#[test]
fn determinant_kernel_labels_and_branches() {
    let c = compile(DET_KERNEL).unwrap();
    assert!(!c.has_errors(), "{:?}", c.diagnostics());
    assert_eq!(c.entries.len(), 28);
    assert_eq!(c.symbols.get("COMPUTE_DET"), Some(9));
    assert_eq!(c.symbols.get("LOOP"), Some(21));
    assert_eq!(c.symbols.get("END"), Some(28));
    assert_eq!(c.entries[7].word(), Some(0b0001_1000_0000_1001));
    assert_eq!(c.entries[8].word(), Some(0b0001_1000_0001_1100));
    assert_eq!(c.entries[27].word(), Some(0b0001_1000_0001_0101));
    assert_eq!(c.entries[0].word(), Some(0b0101_0000_1101_1110));
    assert_eq!(c.entries[1].word(), Some(0b0011_0000_0000_1111));
}

#[test]
fn trailing_label_after_256_instructions_wraps_to_zero() {
    let mut src = String::from("BRz END\n");
    src.push_str(&"NOP\n".repeat(255));
    src.push_str("END:\n");
    let c = compile(&src).unwrap();
    assert_eq!(c.symbols.get("END"), Some(256));
    assert_eq!(c.entries[0].word(), Some(0b0001_0100_0000_0000));
}
