use std::fmt;
use std::{io, result};

use slog::{Drain, Key, OwnedKVList, Record, KV};
use slog_term::{Decorator, RecordDecorator};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f %:z";

/// Keys that locate a record in the cluster. They are printed in the header
/// instead of with the other fields.
pub const LOCATION_KEYS: &[&str] = &["replica", "column"];

/// PkvFormat formats a record in one line:
/// `[<timestamp>] [<LEVEL>] [<file>:<line>] [replica: r, column: c] <msg>, k: v, ...`
///
/// The location bracket lists only the location keys present in the record or
/// the logger. A record value overrides a logger value of the same key.
pub struct PkvFormat<D>
where
    D: Decorator,
{
    decorator: D,
}

impl<D> Drain for PkvFormat<D>
where
    D: Decorator,
{
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> result::Result<Self::Ok, Self::Err> {
        self.format(record, values)
    }
}

impl<D> PkvFormat<D>
where
    D: Decorator,
{
    pub fn new(d: D) -> PkvFormat<D> {
        PkvFormat { decorator: d }
    }

    fn format(&self, record: &Record, values: &OwnedKVList) -> io::Result<()> {
        let fields = Fields::collect(record, values)?;
        let (location, rest) = fields.split_location();

        self.decorator.with_record(record, values, |decorator| {
            write_log_header(decorator, record)?;
            write_log_location(decorator, &location)?;
            write_log_msg(decorator, record)?;
            write_log_fields(decorator, &rest)?;

            decorator.start_whitespace()?;
            writeln!(decorator)?;

            decorator.flush()
        })
    }
}

/// Fields collects formatted key-values.
#[derive(Default)]
struct Fields {
    kvs: Vec<(String, String)>,
}

impl slog::Serializer for Fields {
    fn emit_arguments(&mut self, key: Key, val: &fmt::Arguments) -> slog::Result {
        self.kvs.push((key.to_string(), val.to_string()));
        Ok(())
    }
}

impl Fields {
    /// collect gathers record key-values then logger key-values, each in the
    /// order they were written.
    fn collect(record: &Record, values: &OwnedKVList) -> io::Result<Fields> {
        // slog emits key-values last first.
        let mut fields = Fields::default();
        record.kv().serialize(record, &mut fields)?;
        fields.kvs.reverse();

        let mut logger_fields = Fields::default();
        values.serialize(record, &mut logger_fields)?;
        logger_fields.kvs.reverse();

        fields.kvs.extend(logger_fields.kvs);
        Ok(fields)
    }

    /// split_location returns the location fields in `LOCATION_KEYS` order and
    /// all other fields. Only the first value of a location key is kept.
    fn split_location(self) -> (Vec<(String, String)>, Vec<(String, String)>) {
        let mut location = Vec::new();
        for k in LOCATION_KEYS.iter() {
            if let Some(kv) = self.kvs.iter().find(|(key, _)| key == k) {
                location.push(kv.clone());
            }
        }

        let rest = self
            .kvs
            .into_iter()
            .filter(|(key, _)| !LOCATION_KEYS.contains(&key.as_str()))
            .collect();

        (location, rest)
    }
}

/// write_log_header writes `[<timestamp>] [<LEVEL>] [<file>:<line>]`.
fn write_log_header(rd: &mut dyn RecordDecorator, record: &Record) -> io::Result<()> {
    rd.start_timestamp()?;
    write!(rd, "[{}]", chrono::Local::now().format(TIMESTAMP_FORMAT))?;

    rd.start_whitespace()?;
    write!(rd, " ")?;

    rd.start_level()?;
    write!(rd, "[{}]", record.level().as_short_str())?;

    rd.start_whitespace()?;
    write!(rd, " ")?;

    // there is no `start_line()` or `start_file()`
    rd.start_msg()?;
    write!(rd, "[{}:{}]", record.file(), record.line())
}

/// write_log_location writes ` [replica: 1, column: 2]`, or nothing if there
/// is no location field.
fn write_log_location(rd: &mut dyn RecordDecorator, location: &[(String, String)]) -> io::Result<()> {
    if location.is_empty() {
        return Ok(());
    }

    rd.start_whitespace()?;
    write!(rd, " ")?;

    rd.start_key()?;
    write!(rd, "[")?;
    for (i, (k, v)) in location.iter().enumerate() {
        if i > 0 {
            write!(rd, ", ")?;
        }
        write!(rd, "{}: {}", k, v)?;
    }
    write!(rd, "]")
}

fn write_log_msg(rd: &mut dyn RecordDecorator, record: &Record) -> io::Result<()> {
    rd.start_whitespace()?;
    write!(rd, " ")?;

    rd.start_msg()?;
    write!(rd, "{}", record.msg())
}

/// write_log_fields writes each field as `, k: v`.
fn write_log_fields(rd: &mut dyn RecordDecorator, fields: &[(String, String)]) -> io::Result<()> {
    for (k, v) in fields.iter() {
        rd.start_comma()?;
        write!(rd, ", ")?;

        rd.start_key()?;
        write!(rd, "{}", k)?;

        rd.start_separator()?;
        write!(rd, ": ")?;

        rd.start_value()?;
        write!(rd, "{}", v)?;
    }
    Ok(())
}
