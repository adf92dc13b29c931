//! Delimiter-based declaration encoding kept for reading existing rows.
//!
//! Every element of a list is followed by its terminator, so splitting an
//! encoded list always yields one trailing empty element that the decoder
//! drops. An empty list therefore encodes to the empty string. Function and
//! example bodies are base32 encoded since they may contain anything.

use crate::error::{Result, WalkerError};
use crate::model::{Example, Func, Package, Source, Type, Value};
use data_encoding::BASE32;
use serde::{Deserialize, Serialize};

const VALUE_FIELD: &str = "&V#";
const FUNC_FIELD: &str = "&F#";
const TYPE_FIELD: &str = "&T#";
const EXAMPLE_FIELD: &str = "&E#";
const SOURCE_FIELD: &str = "&S#";
const RECORD: &str = "&$#";
const METHOD: &str = "&M#";
const TYPE_RECORD: &str = "&##";

/// Flattened declaration columns as stored by the legacy schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatDecl {
    pub doc: String,
    pub truncated: bool,
    pub consts: String,
    pub iconsts: String,
    pub vars: String,
    pub ivars: String,
    pub funcs: String,
    pub ifuncs: String,
    pub types: String,
    pub itypes: String,
    pub examples: String,
    pub imports: String,
    pub test_imports: String,
    pub files: String,
    pub test_files: String,
    pub dirs: String,
}

/// Flattens the declaration part of `pkg`.
pub fn encode(pkg: &Package) -> FlatDecl {
    FlatDecl {
        doc: pkg.doc.clone(),
        truncated: pkg.truncated,
        consts: encode_values(&pkg.consts),
        iconsts: encode_values(&pkg.iconsts),
        vars: encode_values(&pkg.vars),
        ivars: encode_values(&pkg.ivars),
        funcs: encode_funcs(&pkg.funcs, RECORD),
        ifuncs: encode_funcs(&pkg.ifuncs, RECORD),
        types: encode_types(&pkg.types),
        itypes: encode_types(&pkg.itypes),
        examples: encode_examples(&pkg.examples),
        imports: encode_strings(&pkg.imports),
        test_imports: encode_strings(&pkg.test_imports),
        files: encode_sources(&pkg.files),
        test_files: encode_sources(&pkg.test_files),
        dirs: encode_strings(&pkg.dirs),
    }
}

/// Rebuilds the declaration part of a package from its flattened columns.
///
/// Only the fields [`encode`] writes are populated; the rest keep their
/// defaults.
pub fn decode(flat: &FlatDecl) -> Result<Package> {
    Ok(Package {
        doc: flat.doc.clone(),
        truncated: flat.truncated,
        consts: decode_values(&flat.consts)?,
        iconsts: decode_values(&flat.iconsts)?,
        vars: decode_values(&flat.vars)?,
        ivars: decode_values(&flat.ivars)?,
        funcs: decode_funcs(&flat.funcs, RECORD)?,
        ifuncs: decode_funcs(&flat.ifuncs, RECORD)?,
        types: decode_types(&flat.types)?,
        itypes: decode_types(&flat.itypes)?,
        examples: decode_examples(&flat.examples)?,
        imports: decode_strings(&flat.imports),
        test_imports: decode_strings(&flat.test_imports),
        files: decode_sources(&flat.files)?,
        test_files: decode_sources(&flat.test_files)?,
        dirs: decode_strings(&flat.dirs),
        ..Package::default()
    })
}

/// Splits `s` on `sep` and drops the trailing terminator element.
fn records<'a>(s: &'a str, sep: &str) -> Vec<&'a str> {
    let mut parts: Vec<&str> = s.split(sep).collect();
    parts.pop();
    parts
}

fn fields<'a, const N: usize>(record: &'a str, sep: &str, what: &str) -> Result<[&'a str; N]> {
    let parts: Vec<&str> = record.split(sep).collect();
    parts.try_into().map_err(|parts: Vec<&str>| {
        WalkerError::Codec(format!(
            "{} record has {} fields, expected {}",
            what,
            parts.len(),
            N
        ))
    })
}

fn encode_code(code: &str) -> String {
    BASE32.encode(code.as_bytes())
}

fn decode_code(encoded: &str) -> Result<String> {
    let bytes = BASE32
        .decode(encoded.as_bytes())
        .map_err(|e| WalkerError::Codec(format!("invalid base32 code: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| WalkerError::Codec(format!("code is not UTF-8: {}", e)))
}

fn encode_values(values: &[Value]) -> String {
    let mut out = String::new();
    for v in values {
        out.push_str(&[v.name.as_str(), &v.doc, &v.decl, &v.url].join(VALUE_FIELD));
        out.push_str(RECORD);
    }
    out
}

fn decode_values(s: &str) -> Result<Vec<Value>> {
    records(s, RECORD)
        .into_iter()
        .map(|record| {
            let [name, doc, decl, url] = fields::<4>(record, VALUE_FIELD, "value")?;
            Ok(Value {
                name: name.to_string(),
                doc: doc.to_string(),
                decl: decl.to_string(),
                fmt_decl: String::new(),
                url: url.to_string(),
            })
        })
        .collect()
}

fn encode_funcs(funcs: &[Func], terminator: &str) -> String {
    let mut out = String::new();
    for f in funcs {
        let code = encode_code(&f.code);
        out.push_str(&[f.name.as_str(), &f.doc, &f.decl, &f.url, &code].join(FUNC_FIELD));
        out.push_str(terminator);
    }
    out
}

fn decode_funcs(s: &str, terminator: &str) -> Result<Vec<Func>> {
    records(s, terminator)
        .into_iter()
        .map(|record| {
            let [name, doc, decl, url, code] = fields::<5>(record, FUNC_FIELD, "func")?;
            Ok(Func {
                name: name.to_string(),
                doc: doc.to_string(),
                decl: decl.to_string(),
                url: url.to_string(),
                code: decode_code(code)?,
                ..Func::default()
            })
        })
        .collect()
}

fn encode_types(types: &[Type]) -> String {
    let mut out = String::new();
    for t in types {
        out.push_str(&[t.name.as_str(), &t.doc, &t.decl, &t.url].join(TYPE_FIELD));
        for funcs in [&t.funcs, &t.ifuncs, &t.methods, &t.imethods] {
            out.push_str(RECORD);
            out.push_str(&encode_funcs(funcs, METHOD));
        }
        out.push_str(TYPE_RECORD);
    }
    out
}

fn decode_types(s: &str) -> Result<Vec<Type>> {
    records(s, TYPE_RECORD)
        .into_iter()
        .map(|record| {
            let [header, funcs, ifuncs, methods, imethods] = fields::<5>(record, RECORD, "type")?;
            let [name, doc, decl, url] = fields::<4>(header, TYPE_FIELD, "type header")?;
            Ok(Type {
                name: name.to_string(),
                doc: doc.to_string(),
                decl: decl.to_string(),
                url: url.to_string(),
                funcs: decode_funcs(funcs, METHOD)?,
                ifuncs: decode_funcs(ifuncs, METHOD)?,
                methods: decode_funcs(methods, METHOD)?,
                imethods: decode_funcs(imethods, METHOD)?,
                ..Type::default()
            })
        })
        .collect()
}

fn encode_examples(examples: &[Example]) -> String {
    let mut out = String::new();
    for e in examples {
        let code = encode_code(&e.code);
        out.push_str(&[e.name.as_str(), &e.doc, &code, &e.output].join(EXAMPLE_FIELD));
        out.push_str(RECORD);
    }
    out
}

fn decode_examples(s: &str) -> Result<Vec<Example>> {
    records(s, RECORD)
        .into_iter()
        .map(|record| {
            let [name, doc, code, output] = fields::<4>(record, EXAMPLE_FIELD, "example")?;
            Ok(Example {
                name: name.to_string(),
                doc: doc.to_string(),
                code: decode_code(code)?,
                output: output.to_string(),
                used: false,
            })
        })
        .collect()
}

fn encode_sources(sources: &[Source]) -> String {
    let mut out = String::new();
    for s in sources {
        out.push_str(&[s.name.as_str(), &s.browse_url, &s.raw_url].join(SOURCE_FIELD));
        out.push_str(RECORD);
    }
    out
}

fn decode_sources(s: &str) -> Result<Vec<Source>> {
    records(s, RECORD)
        .into_iter()
        .map(|record| {
            let [name, browse_url, raw_url] = fields::<3>(record, SOURCE_FIELD, "source")?;
            Ok(Source::new(name, browse_url, raw_url))
        })
        .collect()
}

fn encode_strings(items: &[String]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(item);
        out.push_str(RECORD);
    }
    out
}

fn decode_strings(s: &str) -> Vec<String> {
    records(s, RECORD).into_iter().map(String::from).collect()
}
