//! Record assembly: template tokens plus one position across every pool.

use std::io::Write;

use anyhow::{Context, Result};

use crate::{
    generators,
    pool::FieldPools,
    template::{Template, Token},
};

pub struct RecordAssembler<'a> {
    template: &'a Template,
    pools: &'a FieldPools,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(template: &'a Template, pools: &'a FieldPools) -> Self {
        debug_assert_eq!(template.field_count(), pools.field_count());
        Self { template, pools }
    }

    pub fn record_count(&self) -> usize {
        self.pools.record_count()
    }

    /// Renders record `index`, reading a fresh UTC timestamp for each
    /// `timestamp` token.
    pub fn assemble(&self, index: usize) -> String {
        self.assemble_with(index, generators::generate_timestamp)
    }

    pub fn assemble_with<F>(&self, index: usize, mut timestamp: F) -> String
    where
        F: FnMut() -> String,
    {
        let mut record = String::new();
        let mut field = 0;
        for token in self.template.tokens() {
            match token {
                Token::Literal(text) => record.push_str(text),
                Token::Field(_) => {
                    record.push_str(self.pools.value(field, index));
                    field += 1;
                }
                Token::Timestamp => record.push_str(&timestamp()),
            }
        }
        record
    }

    /// Writes every record in index order, one per line. Returns the number
    /// of records written.
    pub fn write_all<W: Write>(&self, writer: &mut W) -> Result<usize> {
        for index in 0..self.record_count() {
            let record = self.assemble(index);
            writeln!(writer, "{record}").with_context(|| format!("Writing record {}", index + 1))?;
        }
        writer.flush().context("Flushing generated records")?;
        Ok(self.record_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::GenerateOptions;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn build(source: &str, count: usize) -> (Template, FieldPools) {
        let template = Template::parse(source).expect("parse");
        let mut rng = StdRng::seed_from_u64(17);
        let pools = FieldPools::build(&template, &GenerateOptions::new(count), &mut rng).expect("pools");
        (template, pools)
    }

    #[test]
    fn substitutes_pool_values_in_template_order() {
        let (template, pools) = build(r#"{ "a" : int 1 , "b" : bool 0 }"#, 3);
        let assembler = RecordAssembler::new(&template, &pools);
        for index in 0..3 {
            let expected = format!(
                "{{\"a\":{},\"b\":{}}}",
                pools.value(0, index),
                pools.value(1, index)
            );
            assert_eq!(assembler.assemble(index), expected);
        }
    }

    #[test]
    fn timestamps_come_from_the_supplied_clock() {
        let (template, pools) = build(r#"{ "t" : timestamp , "u" : timestamp }"#, 1);
        let assembler = RecordAssembler::new(&template, &pools);
        let mut ticks = 0;
        let record = assembler.assemble_with(0, || {
            ticks += 1;
            format!("\"t{ticks}\"")
        });
        assert_eq!(record, r#"{"t":"t1","u":"t2"}"#);
    }

    #[test]
    fn write_all_emits_one_line_per_record() {
        let (template, pools) = build(r#"{ "s" : str 0.5 "[a-z]{2}\n?" , "ts" : timestamp }"#, 6);
        let assembler = RecordAssembler::new(&template, &pools);
        let mut buffer = Vec::new();
        let written = assembler.write_all(&mut buffer).expect("write");
        assert_eq!(written, 6);
        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(text.lines().count(), 6);
        assert!(text.ends_with('\n'));
        let shape = regex::Regex::new(
            r#"^\{"s":"[a-z]{2}","ts":"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{6}Z"\}$"#,
        )
        .expect("shape");
        for line in text.lines() {
            assert!(shape.is_match(line), "{line}");
        }
    }

    #[test]
    fn compact_template_yields_parseable_json() {
        let (template, pools) = build(r#"{"a": str 1 "[a-z]{3}","b": int 0,"at": timestamp}"#, 5);
        let assembler = RecordAssembler::new(&template, &pools);
        for index in 0..5 {
            let record = assembler.assemble(index);
            let value: serde_json::Value = serde_json::from_str(&record).expect(&record);
            let object = value.as_object().expect("object");
            assert_eq!(object.len(), 3, "{record}");
            assert_eq!(object["a"].as_str().map(str::len), Some(3));
            assert!(object["b"].is_i64());
            assert!(object["at"].is_string());
        }
    }
}
