/*
    edtool
    https://github.com/dbalsom/edskit

    Copyright 2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------
*/
use bpaf::*;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub enum Command {
    Version,
    Info(InfoParams),
    Dump(DumpParams),
    Dir(DirParams),
    Deleted(DirParams),
    Extract(ExtractParams),
    Read(ReadParams),
    Rpm(RpmParams),
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::Version => write!(f, "version"),
            Command::Info(_) => write!(f, "info"),
            Command::Dump(_) => write!(f, "dump"),
            Command::Dir(_) => write!(f, "dir"),
            Command::Deleted(_) => write!(f, "deleted"),
            Command::Extract(_) => write!(f, "extract"),
            Command::Read(_) => write!(f, "read"),
            Command::Rpm(_) => write!(f, "rpm"),
        }
    }
}

#[derive(Debug)]
pub struct AppParams {
    pub global: GlobalOptions,
    pub command: Command,
}

#[derive(Debug)]
pub struct GlobalOptions {
    pub silent: bool,
}

#[derive(Clone, Debug)]
pub struct InfoParams {
    pub in_file: PathBuf,
    pub sectors: bool,
}

#[derive(Clone, Debug)]
pub struct DumpParams {
    pub in_file: PathBuf,
    pub cylinder: u8,
    pub head: u8,
    pub sector: u8,
}

#[derive(Clone, Debug)]
pub struct DirParams {
    pub in_file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ExtractParams {
    pub in_file: PathBuf,
    pub path: String,
    pub out_file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ReadParams {
    pub out_file: PathBuf,
    pub format: Option<String>,
    pub tracks: Option<String>,
    pub revs: u8,
    pub retries: u8,
    pub gw: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RpmParams {
    pub gw: Option<String>,
}

pub fn global_options_parser() -> impl Parser<GlobalOptions> {
    let silent = long("silent").help("Suppress all output except required output").switch();

    construct!(GlobalOptions { silent })
}

pub(crate) fn in_file_parser() -> impl Parser<PathBuf> {
    short('i')
        .long("in_file")
        .help("The input image file")
        .argument::<PathBuf>("IN_FILE")
}

fn gw_parser() -> impl Parser<Option<String>> {
    long("gw")
        .help("Path to the Greaseweazle gw tool (default: gw from PATH)")
        .argument::<String>("GW")
        .optional()
}

fn info_parser() -> OptionParser<Command> {
    let in_file = in_file_parser();
    let sectors = long("sectors").help("List every sector with FDC status flags").switch();
    construct!(InfoParams { in_file, sectors })
        .map(Command::Info)
        .to_options()
        .descr("Display container, track and filesystem information")
}

fn dump_parser() -> OptionParser<Command> {
    let in_file = in_file_parser();
    let cylinder = short('c')
        .long("cylinder")
        .help("Physical cylinder")
        .argument::<u8>("CYLINDER");
    let head = long("head").help("Physical head").argument::<u8>("HEAD");
    let sector = short('s')
        .long("sector")
        .help("Sector id (R), e.g. 0xC1 as decimal 193")
        .argument::<u8>("SECTOR");
    construct!(DumpParams {
        in_file,
        cylinder,
        head,
        sector
    })
    .map(Command::Dump)
    .to_options()
    .descr("Hex dump one sector")
}

fn dir_params_parser() -> impl Parser<DirParams> {
    let in_file = in_file_parser();
    construct!(DirParams { in_file })
}

fn extract_parser() -> OptionParser<Command> {
    let in_file = in_file_parser();
    let path = short('p')
        .long("path")
        .help("Path of the file within the disk, e.g. DATA/SAVE.BIN")
        .argument::<String>("PATH");
    let out_file = short('o')
        .long("out_file")
        .help("Where to write the extracted bytes")
        .argument::<PathBuf>("OUT_FILE");
    construct!(ExtractParams { in_file, path, out_file })
        .map(Command::Extract)
        .to_options()
        .descr("Extract one file from a FAT12 volume")
}

fn read_parser() -> OptionParser<Command> {
    let out_file = short('o')
        .long("out_file")
        .help("Output image file to create")
        .argument::<PathBuf>("OUT_FILE");
    let format = long("format")
        .help("Capture format passed to gw read --format")
        .argument::<String>("FORMAT")
        .optional();
    let tracks = long("tracks")
        .help("Track range passed to gw read --tracks")
        .argument::<String>("TRACKS")
        .optional();
    let revs = long("revs")
        .help("Revolutions per track")
        .argument::<u8>("REVS")
        .fallback(3)
        .display_fallback();
    let retries = long("retries")
        .help("Retries on bad reads")
        .argument::<u8>("RETRIES")
        .fallback(3)
        .display_fallback();
    let gw = gw_parser();
    construct!(ReadParams {
        out_file,
        format,
        tracks,
        revs,
        retries,
        gw
    })
    .map(Command::Read)
    .to_options()
    .descr("Read a physical disk with a Greaseweazle")
}

fn rpm_parser() -> OptionParser<Command> {
    let gw = gw_parser();
    construct!(RpmParams { gw })
        .map(Command::Rpm)
        .to_options()
        .descr("Measure drive spindle speed")
}

pub fn command_parser() -> OptionParser<AppParams> {
    let global = global_options_parser();

    let version = pure(Command::Version)
        .to_options()
        .descr("Display edtool version")
        .command("version");
    let info = info_parser().command("info");
    let dump = dump_parser().command("dump");
    let dir = dir_params_parser()
        .map(Command::Dir)
        .to_options()
        .descr("List the FAT12 directory tree")
        .command("dir");
    let deleted = dir_params_parser()
        .map(Command::Deleted)
        .to_options()
        .descr("List deleted FAT12 entries and their recoverability")
        .command("deleted");
    let extract = extract_parser().command("extract");
    let read = read_parser().command("read");
    let rpm = rpm_parser().command("rpm");

    let command = construct!([version, info, dump, dir, deleted, extract, read, rpm]);

    construct!(AppParams { global, command })
        .to_options()
        .descr("edtool: inspect CPC disk images and drive a Greaseweazle")
}
