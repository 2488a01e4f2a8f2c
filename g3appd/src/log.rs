/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::io::{self, Write};

use chrono::Local;
use slog::{Drain, KV, Key, OwnedKVList, Record, Serializer, slog_o};
use slog_scope::GlobalLoggerGuard;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

struct KvSerializer<'a> {
    buf: &'a mut Vec<u8>,
}

impl Serializer for KvSerializer<'_> {
    fn emit_arguments(&mut self, key: Key, val: &fmt::Arguments) -> slog::Result {
        write!(self.buf, " {key}: {val},")?;
        Ok(())
    }
}

struct StderrDrain {
    append_code_position: bool,
}

impl Drain for StderrDrain {
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> io::Result<()> {
        let mut buf: Vec<u8> = Vec::with_capacity(256);
        write!(buf, "{} {}", Local::now().format(TIME_FORMAT), record.level())?;

        let mut serializer = KvSerializer { buf: &mut buf };
        record.kv().serialize(record, &mut serializer)?;
        values.serialize(record, &mut serializer)?;

        write!(buf, " {}", record.msg())?;
        if self.append_code_position {
            write!(buf, " <{}:{}>", record.module(), record.line())?;
        }
        writeln!(buf)?;

        let mut stderr = io::stderr().lock();
        stderr.write_all(&buf)?;
        stderr.flush()
    }
}

pub fn setup(verbose_level: u8) -> Result<GlobalLoggerGuard, log::SetLoggerError> {
    let drain = StderrDrain {
        append_code_position: verbose_level > 1,
    };
    let logger = slog::Logger::root(drain.ignore_res(), slog_o!());

    let scope_guard = slog_scope::set_global_logger(logger);

    let log_level = match verbose_level {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    };

    slog_stdlog::init_with_level(log_level)?;
    Ok(scope_guard)
}
