//! 32-bit x86 opcodes and disassembly

use iced_x86::{Decoder, DecoderOptions, Formatter, Mnemonic, NasmFormatter};

/// Opcode of `jle rel8`
pub const JLE_SHORT: u8 = 0x7e;
/// Opcode of `jmp rel8`
pub const JMP_SHORT: u8 = 0xeb;

/// Bitness of the code being decoded
const BITNESS: u32 = 32;

/// Decodes the 32-bit instruction starting at `offset` and returns its mnemonic.
///
/// The file offset is used as the instruction pointer, so branch targets are file offsets as well.
/// Returns `None` if `offset` is out of range or the bytes there don't form a valid instruction.
pub fn mnemonic(buffer: &[u8], offset: usize) -> Option<Mnemonic> {
    let code = buffer.get(offset..)?;
    let instruction = Decoder::with_ip(BITNESS, code, offset as u64, DecoderOptions::NONE).decode();
    (!instruction.is_invalid()).then(|| instruction.mnemonic())
}

/// Disassembles the 32-bit instruction starting at `offset` in NASM syntax, for display.
///
/// See [`mnemonic`] for how addresses are computed.
pub fn describe(buffer: &[u8], offset: usize) -> Option<String> {
    let code = buffer.get(offset..)?;
    let instruction = Decoder::with_ip(BITNESS, code, offset as u64, DecoderOptions::NONE).decode();
    if instruction.is_invalid() {
        return None;
    }

    let mut output = String::new();
    NasmFormatter::new().format(&instruction, &mut output);
    Some(output)
}
