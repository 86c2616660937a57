use std::{
    io::{self, Write},
    path::Path,
};

use ksmscope::{
    disassembler::{ArgumentValue, CodeUnit, DebugTable, Instruction},
    KsmFile,
};

/// Display options for KSM disassembly output.
pub struct DisasmOptions {
    pub pool: bool,
    pub debug: bool,
    pub no_header: bool,
}

/// Formats a decoded KSM file as a text listing.
pub struct KsmFormatter {
    pub opts: DisasmOptions,
}

impl KsmFormatter {
    pub fn new(opts: DisasmOptions) -> Self {
        Self { opts }
    }

    /// Write the complete listing: summary header, argument pool, code
    /// sections, and debug map, honoring the suppression options.
    pub fn format_listing(
        &self,
        w: &mut dyn Write,
        ksm: &KsmFile,
        path: &Path,
        payload_size: usize,
    ) -> io::Result<()> {
        if !self.opts.no_header {
            Self::format_header(w, ksm, path, payload_size)?;
        }

        if self.opts.pool {
            Self::format_pool(w, ksm)?;
        }

        let multiple = ksm.units().len() > 1;
        for (index, unit) in ksm.units().iter().enumerate() {
            Self::format_unit(w, unit, index, multiple)?;
        }

        if self.opts.debug {
            Self::format_debug(w, ksm.debug())?;
        }

        Ok(())
    }

    /// Write the file summary block.
    fn format_header(
        w: &mut dyn Write,
        ksm: &KsmFile,
        path: &Path,
        payload_size: usize,
    ) -> io::Result<()> {
        writeln!(w, "File:    {}", path.display())?;
        writeln!(w, "Payload: {payload_size} bytes")?;
        writeln!(w, "Units:   {}", ksm.units().len())?;
        writeln!(w)?;
        Ok(())
    }

    /// Write the argument section: offset, tag name, rendered value.
    fn format_pool(w: &mut dyn Write, ksm: &KsmFile) -> io::Result<()> {
        writeln!(
            w,
            "Argument section (index width: {}):",
            width_text(ksm.index_width())
        )?;
        for argument in ksm.arguments() {
            let tag = argument.tag().to_string();
            match value_text(&argument.value) {
                Some(text) => writeln!(w, "  {:<6}{:<20}{}", argument.offset, tag, text)?,
                None => writeln!(w, "  {:<6}{}", argument.offset, tag)?,
            }
        }
        writeln!(w)?;
        Ok(())
    }

    /// Write one code unit's three sections.
    fn format_unit(
        w: &mut dyn Write,
        unit: &CodeUnit,
        index: usize,
        multiple: bool,
    ) -> io::Result<()> {
        if multiple {
            writeln!(w, "Code unit {}:", index + 1)?;
        }
        Self::format_section(w, "Function section:", &unit.function)?;
        Self::format_section(w, "Initialization section:", &unit.init)?;
        Self::format_section(w, "Main section:", &unit.main)?;
        Ok(())
    }

    /// Write one section: title, then numbered instructions.
    fn format_section(
        w: &mut dyn Write,
        title: &str,
        instructions: &[Instruction],
    ) -> io::Result<()> {
        writeln!(w, "{title}")?;
        for (number, instruction) in instructions.iter().enumerate() {
            Self::format_instruction(w, number + 1, instruction)?;
        }
        writeln!(w)?;
        Ok(())
    }

    /// Write one instruction line: sequence number, mnemonic, operand indices.
    fn format_instruction(
        w: &mut dyn Write,
        number: usize,
        instruction: &Instruction,
    ) -> io::Result<()> {
        if instruction.operands.is_empty() {
            writeln!(w, "  {:<6}{}", number, instruction.opcode.mnemonic)
        } else {
            let operands = instruction
                .operands
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                w,
                "  {:<6}{:<16}{}",
                number, instruction.opcode.mnemonic, operands
            )
        }
    }

    /// Write the debug section: one line per record with its ranges.
    fn format_debug(w: &mut dyn Write, debug: &DebugTable) -> io::Result<()> {
        writeln!(
            w,
            "Debug section (index width: {}):",
            width_text(debug.index_width)
        )?;
        for line in &debug.lines {
            let ranges = line
                .ranges
                .iter()
                .map(|(start, end)| format!("[{start}..{end}]"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(w, "  Line {:<6}{}", line.line_number, ranges)?;
        }
        Ok(())
    }
}

fn width_text(width: u8) -> String {
    if width == 1 {
        "1 byte".to_string()
    } else {
        format!("{width} bytes")
    }
}

/// Rendered value payload, or `None` for tags that carry none.
fn value_text(value: &ArgumentValue) -> Option<String> {
    match value {
        ArgumentValue::Null | ArgumentValue::ArgMarker => None,
        ArgumentValue::Bool(v) | ArgumentValue::BoolValue(v) => Some(v.to_string()),
        ArgumentValue::Byte(v) => Some(v.to_string()),
        ArgumentValue::Sword(v) => Some(v.to_string()),
        ArgumentValue::Word(v) => Some(v.to_string()),
        ArgumentValue::Float(v) => Some(v.to_string()),
        ArgumentValue::Double(v) | ArgumentValue::ScalarDoubleValue(v) => Some(v.to_string()),
        ArgumentValue::ScalarIntValue(v) => Some(v.to_string()),
        ArgumentValue::String(v) | ArgumentValue::StringValue(v) => Some(format!("{v:?}")),
    }
}
