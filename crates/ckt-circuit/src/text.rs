//! The external circuit file format: a stable, platform-independent text
//! encoding. One header line, one line per gate, then the ordered output
//! wire list.

use std::io::{BufRead, Write};

use crate::circuit::SealedCircuit;
use crate::error::{CktError, CktResult};
use crate::gate::{Gate, GateType};
use crate::wire::Wire;

/// Writes `circuit` in this module's external text format.
pub fn write_text(writer: &mut impl Write, circuit: &SealedCircuit) -> CktResult<()> {
    writeln!(
        writer,
        "{} {} {} {}",
        circuit.gates.len(),
        circuit.num_wires,
        circuit.num_input_bits,
        circuit.outputs.len()
    )?;

    for gate in &circuit.gates {
        writeln!(
            writer,
            "{} {} {} {}",
            gate.left,
            gate.right,
            gate.output,
            gate.ty.to_format_bit()
        )?;
    }

    let outputs: Vec<String> = circuit.outputs.iter().map(Wire::to_string).collect();
    writeln!(writer, "{}", outputs.join(" "))?;

    Ok(())
}

/// Parses a circuit previously written by [`write_text`].
///
/// Does not re-validate topological order or wire reuse — those invariants
/// are guaranteed by the writer side producing a [`SealedCircuit`] in the
/// first place; a hand-edited or corrupted file will simply fail later, at
/// evaluation or equivalence-checking time, when an unresolved wire read
/// occurs.
pub fn read_text(reader: &mut impl BufRead) -> CktResult<SealedCircuit> {
    let mut lines = reader.lines();

    let header = lines
        .next()
        .ok_or_else(|| CktError::MalformedFile("missing header line".into()))??;
    let mut header_fields = header.split_whitespace();
    let num_gates = parse_field(&mut header_fields, "num_gates")?;
    let num_wires = parse_field(&mut header_fields, "num_wires")?;
    let num_input_bits = parse_field(&mut header_fields, "num_inputs")?;
    let num_outputs: u64 = parse_field(&mut header_fields, "num_outputs")?;

    let mut gates = Vec::with_capacity(num_gates as usize);
    for i in 0..num_gates {
        let line = lines.next().ok_or_else(|| {
            CktError::MalformedFile(format!("missing gate line {i} of {num_gates}"))
        })??;
        let mut fields = line.split_whitespace();
        let left: u32 = parse_field(&mut fields, "left")?;
        let right: u32 = parse_field(&mut fields, "right")?;
        let output: u32 = parse_field(&mut fields, "output")?;
        let ty_bit: u8 = parse_field(&mut fields, "type")?;
        let ty = GateType::from_format_bit(ty_bit)
            .ok_or_else(|| CktError::MalformedFile(format!("invalid gate type bit {ty_bit}")))?;
        gates.push(Gate::new(Wire::from(left), Wire::from(right), Wire::from(output), ty));
    }

    let outputs_line = lines
        .next()
        .ok_or_else(|| CktError::MalformedFile("missing output list line".into()))??;
    let outputs: Vec<Wire> = if outputs_line.trim().is_empty() {
        Vec::new()
    } else {
        outputs_line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<u32>()
                    .map(Wire::from)
                    .map_err(|e| CktError::MalformedFile(format!("bad output wire id: {e}")))
            })
            .collect::<CktResult<Vec<_>>>()?
    };

    if outputs.len() as u64 != num_outputs {
        return Err(CktError::MalformedFile(format!(
            "header declared {num_outputs} outputs but found {}",
            outputs.len()
        )));
    }

    Ok(SealedCircuit {
        num_input_bits,
        gates,
        num_wires,
        outputs,
    })
}

fn parse_field<T: std::str::FromStr>(
    fields: &mut std::str::SplitWhitespace<'_>,
    name: &str,
) -> CktResult<T> {
    let tok = fields
        .next()
        .ok_or_else(|| CktError::MalformedFile(format!("missing field {name}")))?;
    tok.parse::<T>()
        .map_err(|_| CktError::MalformedFile(format!("invalid field {name}: {tok}")))
}
