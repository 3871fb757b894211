//! Drives a single machine from the terminal.

use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context};
use intcode_vm::ascii;
use intcode_vm::trace::{LogTrace, NoopTrace, Trace};
use intcode_vm::{Image, IntcodeVM, Status};

use crate::args::{RunArgs, ShowArgs};

/// Reads and parses the program image stored at `path`.
pub fn load_image(path: &Path) -> anyhow::Result<Image> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;

    text.parse()
        .with_context(|| format!("failed to parse `{}`", path.display()))
}

/// Runs the program described by `args` until it halts.
pub fn run(args: &RunArgs) -> anyhow::Result<()> {
    let image = load_image(&args.program)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    drive(&image, args, stdin.lock(), &mut stdout)?;

    Ok(())
}

/// Runs `image` to completion, reading extra input lines from `lines` and writing outputs to
/// `out`.
///
/// Outputs are written each time the machine stops, before any line is read.
fn drive<R: BufRead, W: Write>(
    image: &[i64],
    args: &RunArgs,
    lines: R,
    out: &mut W,
) -> anyhow::Result<IntcodeVM> {
    let mut vm = IntcodeVM::new(image);

    for &(address, value) in &args.patches {
        vm.memory_mut()
            .write(address, value)
            .with_context(|| format!("failed to patch address {address}"))?;
    }

    let mut pending: VecDeque<i64> = args.input.iter().copied().collect();
    let mut trace: Box<dyn Trace> = if args.trace {
        Box::new(LogTrace)
    } else {
        Box::new(NoopTrace)
    };
    let mut lines = lines.lines();

    loop {
        let mut outputs = Vec::new();
        let status = vm
            .run_traced(|| pending.pop_front(), |v| outputs.push(v), &mut *trace)
            .context("the program failed")?;

        write_outputs(out, &outputs, args.ascii)?;
        out.flush()?;

        match status {
            Status::Halted => break,
            Status::Running => (),
            Status::AwaitingInput => {
                let ip = vm.cpu().ip;
                if args.no_stdin {
                    bail!("the program is waiting for input at address {ip}");
                }

                let Some(line) = lines.next() else {
                    bail!("the program is waiting for input at address {ip}, but stdin is closed");
                };
                let line = line.context("failed to read stdin")?;

                queue_line(&mut pending, &line, args.ascii)?;
            }
        }
    }

    Ok(vm)
}

/// Prints the canonical form of a program image.
pub fn show(args: &ShowArgs) -> anyhow::Result<()> {
    let image = load_image(&args.program)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{} cells", image.len())?;
    writeln!(stdout, "{image}")?;

    Ok(())
}

/// Turns a line read from the terminal into input values.
fn queue_line(pending: &mut VecDeque<i64>, line: &str, ascii: bool) -> anyhow::Result<()> {
    if ascii {
        pending.extend(ascii::encode_line(line));
    } else {
        let values: Image = line
            .parse()
            .with_context(|| format!("invalid input `{}`", line.trim()))?;
        pending.extend(values.iter().copied());
    }

    Ok(())
}

/// Writes emitted values, either one per line or as ASCII text.
///
/// In ASCII mode, values outside of the ASCII range follow the text on their own line.
fn write_outputs<W: Write>(out: &mut W, values: &[i64], ascii: bool) -> io::Result<()> {
    if !ascii {
        for value in values {
            writeln!(out, "{value}")?;
        }
        return Ok(());
    }

    let (text, others) = ascii::decode(values);
    out.write_all(text.as_bytes())?;
    for value in others {
        // Keep numeric answers apart from the surrounding text.
        writeln!(out)?;
        writeln!(out, "{value}")?;
    }

    Ok(())
}
