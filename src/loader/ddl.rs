//! Token-based DDL loading
//!
//! Reads the subset of DDL that describes table structure:
//!
//! ```sql
//! CREATE TABLE [IF NOT EXISTS] [schema.]name (
//!     col TYPE[(n[, s])] [NOT NULL] [PRIMARY KEY] [IDENTITY | AUTO_INCREMENT] [REFERENCES t (c)],
//!     [CONSTRAINT n] PRIMARY KEY (cols),
//!     [CONSTRAINT n] FOREIGN KEY (cols) REFERENCES t (cols)
//! )
//! ALTER TABLE name ADD [CONSTRAINT n] FOREIGN KEY (cols) REFERENCES t (cols)
//! ALTER TABLE name ADD [CONSTRAINT n] PRIMARY KEY (cols)
//! ```
//!
//! Everything else is skipped.

use std::path::Path;

use sqlparser::dialect as sql_dialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, Tokenizer};

use crate::dialect::{Dialect, TypeMap};
use crate::error::DbMergeError;
use crate::model::{DataMap, DbAttribute, DbEntity, DbRelationship, SqlType};

/// A foreign key waiting for all tables to be known
#[derive(Debug, Clone)]
struct PendingFk {
    name: Option<String>,
    source: String,
    columns: Vec<String>,
    target: String,
    referenced: Vec<String>,
}

/// Accumulates tables from one or more DDL scripts
pub struct DdlLoader {
    dialect: Dialect,
    types: TypeMap,
    map: DataMap,
    pending: Vec<PendingFk>,
}

impl DdlLoader {
    pub fn new(name: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            dialect,
            types: TypeMap::for_dialect(dialect),
            map: DataMap::new(name),
            pending: Vec::new(),
        }
    }

    /// Reads every statement of `sql`; `path` is only used in errors
    pub fn load(&mut self, path: &Path, sql: &str) -> Result<(), DbMergeError> {
        let tokens = tokenize(sql, self.dialect).map_err(|message| {
            DbMergeError::SqlParseError {
                path: path.to_path_buf(),
                message,
            }
        })?;

        for statement in split_statements(tokens) {
            let mut cursor = Cursor::new(statement);
            let result = if cursor.check_keyword(Keyword::CREATE) {
                self.create_statement(&mut cursor)
            } else if cursor.check_keyword(Keyword::ALTER) {
                self.alter_statement(&mut cursor)
            } else {
                tracing::debug!(statement = %cursor.describe(), "Skipping statement");
                Ok(())
            };
            result.map_err(|message| DbMergeError::SqlParseError {
                path: path.to_path_buf(),
                message,
            })?;
        }
        Ok(())
    }

    /// Resolves foreign keys and returns the schema
    pub fn finish(mut self) -> Result<DataMap, DbMergeError> {
        for fk in std::mem::take(&mut self.pending) {
            self.resolve_fk(fk)?;
        }
        Ok(self.map)
    }

    fn create_statement(&mut self, cursor: &mut Cursor) -> Result<(), String> {
        cursor.advance();
        while cursor.eat_word("GLOBAL") || cursor.eat_word("LOCAL") || cursor.eat_word("TEMPORARY")
        {}
        if !cursor.eat_keyword(Keyword::TABLE) {
            tracing::debug!(statement = %cursor.describe(), "Skipping CREATE statement");
            return Ok(());
        }
        if cursor.eat_keyword(Keyword::IF) {
            cursor.eat_keyword(Keyword::NOT);
            cursor.eat_keyword(Keyword::EXISTS);
        }

        let (schema, name) = cursor
            .object_name()
            .ok_or("expected table name after CREATE TABLE")?;
        if !cursor.eat(&Token::LParen) {
            return Err(format!("expected '(' after table name {}", name));
        }

        let mut entity = DbEntity::new(name);
        entity.schema = schema;
        let mut pk_columns: Vec<String> = Vec::new();

        loop {
            if cursor.eat(&Token::RParen) {
                break;
            }
            if cursor.is_at_end() {
                return Err(format!("unterminated column list for table {}", entity.name));
            }
            self.table_element(cursor, &mut entity, &mut pk_columns)?;
            cursor.eat(&Token::Comma);
        }

        if !pk_columns.is_empty() {
            set_primary_key(&mut entity, &pk_columns).map_err(|e| e.to_string())?;
        }
        tracing::debug!(table = %entity.name, columns = entity.attributes.len(), "Loaded table");
        self.map.add_entity(entity);
        Ok(())
    }

    fn table_element(
        &mut self,
        cursor: &mut Cursor,
        entity: &mut DbEntity,
        pk_columns: &mut Vec<String>,
    ) -> Result<(), String> {
        let constraint = if cursor.eat_keyword(Keyword::CONSTRAINT) {
            cursor.ident()
        } else {
            None
        };

        if cursor.eat_keyword(Keyword::PRIMARY) {
            cursor.eat_keyword(Keyword::KEY);
            cursor.eat_word("CLUSTERED");
            cursor.eat_word("NONCLUSTERED");
            *pk_columns = cursor.ident_list().ok_or("expected PRIMARY KEY column list")?;
            if constraint.is_some() {
                entity.primary_key_name = constraint;
            }
            cursor.skip_element();
        } else if cursor.eat_keyword(Keyword::FOREIGN) {
            cursor.eat_keyword(Keyword::KEY);
            let columns = cursor.ident_list().ok_or("expected FOREIGN KEY column list")?;
            let fk = self.references(cursor, constraint, &entity.name, columns)?;
            self.pending.push(fk);
            cursor.skip_element();
        } else if constraint.is_some()
            || ["UNIQUE", "CHECK", "KEY", "INDEX", "FULLTEXT", "SPATIAL"]
                .iter()
                .any(|w| cursor.check_word(w))
        {
            cursor.skip_element();
        } else {
            let column = self.column(cursor, &entity.name)?;
            entity.add_attribute(column);
        }
        Ok(())
    }

    fn column(&mut self, cursor: &mut Cursor, table: &str) -> Result<DbAttribute, String> {
        let name = cursor
            .ident()
            .ok_or_else(|| format!("expected column name in table {}", table))?;
        let mut column = self.data_type(cursor, name)?;
        let mut constraint = None;

        while !cursor.at_element_end() {
            if cursor.eat_keyword(Keyword::NOT) {
                if cursor.eat_keyword(Keyword::NULL) {
                    column.mandatory = true;
                }
            } else if cursor.eat_keyword(Keyword::NULL) {
                column.mandatory = false;
            } else if cursor.eat_keyword(Keyword::CONSTRAINT) {
                constraint = cursor.ident();
            } else if cursor.eat_keyword(Keyword::PRIMARY) {
                cursor.eat_keyword(Keyword::KEY);
                column.primary_key = true;
                column.mandatory = true;
            } else if cursor.eat_word("IDENTITY") {
                column.generated = true;
                cursor.skip_group();
            } else if cursor.eat_word("AUTO_INCREMENT") || cursor.eat_word("AUTOINCREMENT") {
                column.generated = true;
            } else if cursor.eat_word("GENERATED") {
                while cursor.eat_word("ALWAYS")
                    || cursor.eat_keyword(Keyword::BY)
                    || cursor.eat_keyword(Keyword::DEFAULT)
                    || cursor.eat_keyword(Keyword::ON)
                    || cursor.eat_keyword(Keyword::NULL)
                    || cursor.eat_keyword(Keyword::AS)
                {}
                if cursor.eat_word("IDENTITY") {
                    column.generated = true;
                }
                cursor.skip_group();
            } else if cursor.check_keyword(Keyword::REFERENCES) {
                let fk = self.references(
                    cursor,
                    constraint.take(),
                    table,
                    vec![column.name.clone()],
                )?;
                self.pending.push(fk);
            } else if cursor.eat_keyword(Keyword::DEFAULT) {
                if cursor.check(&Token::LParen) {
                    cursor.skip_group();
                } else {
                    cursor.eat(&Token::Minus);
                    cursor.advance();
                    cursor.skip_group();
                }
            } else if cursor.check(&Token::LParen) {
                cursor.skip_group();
            } else {
                cursor.advance();
            }
        }
        Ok(column)
    }

    fn data_type(&self, cursor: &mut Cursor, name: String) -> Result<DbAttribute, String> {
        let first = cursor
            .ident()
            .ok_or_else(|| format!("expected type for column {}", name))?
            .to_ascii_uppercase();

        let type_name = match first.as_str() {
            "DOUBLE" => {
                cursor.eat_word("PRECISION");
                first.clone()
            }
            "CHARACTER" | "CHAR" if cursor.eat_word("VARYING") => "VARCHAR".to_string(),
            "LONG" if cursor.eat_word("VARCHAR") => "LONGVARCHAR".to_string(),
            "LONG" if cursor.eat_word("VARBINARY") || cursor.eat_word("RAW") => {
                "LONGVARBINARY".to_string()
            }
            "NATIONAL" => {
                if !cursor.eat_word("CHARACTER") {
                    cursor.eat_word("CHAR");
                }
                if cursor.eat_word("VARYING") {
                    "NVARCHAR".to_string()
                } else {
                    "NCHAR".to_string()
                }
            }
            _ => first.clone(),
        };

        let mut sql_type = self
            .types
            .sql_type_of(&type_name)
            .unwrap_or_else(|| SqlType::from_name(&type_name));

        let mut args: Vec<u32> = Vec::new();
        if cursor.eat(&Token::LParen) {
            while !cursor.is_at_end() && !cursor.eat(&Token::RParen) {
                if let Some(Token::Number(n, _)) = cursor.peek() {
                    if let Ok(value) = n.parse::<u32>() {
                        args.push(value);
                    }
                }
                cursor.advance();
            }
        }

        if cursor.check_keyword(Keyword::FOR) && cursor.peek_word_at(1, "BIT") {
            cursor.advance_by(3);
            sql_type = match sql_type {
                SqlType::Char => SqlType::Binary,
                SqlType::Varchar => SqlType::VarBinary,
                SqlType::LongVarchar => SqlType::LongVarBinary,
                other => other,
            };
        }

        let mut column = DbAttribute::new(name, sql_type);
        match (sql_type.is_decimal(), args.as_slice()) {
            (true, [precision, scale, ..]) => column = column.precision(*precision, *scale),
            (_, [length, ..]) => column = column.length(*length),
            _ => {}
        }
        if matches!(type_name.as_str(), "SERIAL" | "BIGSERIAL" | "SMALLSERIAL") {
            column.generated = true;
        }
        Ok(column)
    }

    /// Parses `REFERENCES target [(cols)]`
    fn references(
        &self,
        cursor: &mut Cursor,
        name: Option<String>,
        source: &str,
        columns: Vec<String>,
    ) -> Result<PendingFk, String> {
        if !cursor.eat_keyword(Keyword::REFERENCES) {
            return Err(format!("expected REFERENCES in foreign key of {}", source));
        }
        let (_, target) = cursor
            .object_name()
            .ok_or_else(|| format!("expected referenced table in foreign key of {}", source))?;
        let referenced = if cursor.check(&Token::LParen) {
            cursor.ident_list().unwrap_or_default()
        } else {
            Vec::new()
        };
        Ok(PendingFk {
            name,
            source: source.to_string(),
            columns,
            target,
            referenced,
        })
    }

    fn alter_statement(&mut self, cursor: &mut Cursor) -> Result<(), String> {
        cursor.advance();
        if !cursor.eat_keyword(Keyword::TABLE) {
            tracing::debug!(statement = %cursor.describe(), "Skipping ALTER statement");
            return Ok(());
        }
        cursor.eat_keyword(Keyword::ONLY);
        if cursor.eat_keyword(Keyword::IF) {
            cursor.eat_keyword(Keyword::EXISTS);
        }
        let (_, table) = cursor
            .object_name()
            .ok_or("expected table name after ALTER TABLE")?;

        loop {
            if !cursor.eat_keyword(Keyword::ADD) {
                tracing::debug!(table = %table, "Skipping ALTER TABLE operation");
                return Ok(());
            }
            let constraint = if cursor.eat_keyword(Keyword::CONSTRAINT) {
                cursor.ident()
            } else {
                None
            };

            if cursor.eat_keyword(Keyword::FOREIGN) {
                cursor.eat_keyword(Keyword::KEY);
                let columns = cursor.ident_list().ok_or("expected FOREIGN KEY column list")?;
                let fk = self.references(cursor, constraint, &table, columns)?;
                self.pending.push(fk);
            } else if cursor.eat_keyword(Keyword::PRIMARY) {
                cursor.eat_keyword(Keyword::KEY);
                cursor.eat_word("CLUSTERED");
                let columns = cursor.ident_list().ok_or("expected PRIMARY KEY column list")?;
                let entity = self
                    .map
                    .entity_mut(&table)
                    .ok_or_else(|| format!("ALTER TABLE on unknown table {}", table))?;
                set_primary_key(entity, &columns).map_err(|e| e.to_string())?;
                if constraint.is_some() {
                    entity.primary_key_name = constraint;
                }
            } else {
                tracing::debug!(table = %table, "Skipping ALTER TABLE ADD");
                return Ok(());
            }

            cursor.skip_element();
            if !cursor.eat(&Token::Comma) {
                return Ok(());
            }
        }
    }

    fn resolve_fk(&mut self, fk: PendingFk) -> Result<(), DbMergeError> {
        let invalid = |message: String| DbMergeError::InvalidMetadata {
            entity: fk.source.clone(),
            message,
        };

        let target = self.map.find_entity(&fk.target, false);
        let target_name = target.map_or(fk.target.clone(), |t| t.name.clone());
        let referenced = if fk.referenced.is_empty() {
            match target {
                Some(t) => t.primary_key_names(),
                None => {
                    tracing::warn!(
                        source = %fk.source,
                        target = %fk.target,
                        "Skipping foreign key to unknown table without column list"
                    );
                    return Ok(());
                }
            }
        } else {
            fk.referenced.clone()
        };
        if referenced.len() != fk.columns.len() {
            return Err(invalid(format!(
                "foreign key to {} has {} column(s) but references {}",
                target_name,
                fk.columns.len(),
                referenced.len()
            )));
        }

        let source_name = match self.map.find_entity(&fk.source, false) {
            Some(source) => source.name.clone(),
            None => return Err(invalid("foreign key on unknown table".to_string())),
        };
        let Some(source) = self.map.entity_mut(&source_name) else {
            return Ok(());
        };

        let base = fk
            .name
            .clone()
            .unwrap_or_else(|| format!("to_{}", target_name));
        let mut name = base.clone();
        let mut suffix = 1;
        while source.relationship(&name).is_some() {
            suffix += 1;
            name = format!("{}_{}", base, suffix);
        }

        let mut relationship = DbRelationship::new(name, source_name.clone(), target_name);
        for (column, target_column) in fk.columns.iter().zip(&referenced) {
            let Some(attribute) = source.find_attribute(column, false) else {
                return Err(invalid(format!("foreign key names unknown column {}", column)));
            };
            relationship = relationship.join(attribute.name.clone(), target_column.clone());
        }
        if let Some(fk_name) = &fk.name {
            relationship = relationship.fk_name(fk_name.clone());
        }
        source.add_relationship(relationship);
        Ok(())
    }
}

/// Marks `columns` as the primary key of `entity`
fn set_primary_key(entity: &mut DbEntity, columns: &[String]) -> Result<(), DbMergeError> {
    for column in columns {
        let name = entity
            .find_attribute(column, false)
            .map(|a| a.name.clone())
            .ok_or_else(|| DbMergeError::InvalidMetadata {
                entity: entity.name.clone(),
                message: format!("primary key names unknown column {}", column),
            })?;
        if let Some(attribute) = entity.attribute_mut(&name) {
            attribute.primary_key = true;
            attribute.mandatory = true;
        }
    }
    Ok(())
}

/// Convenience wrapper: one script, one schema
pub fn parse_ddl(sql: &str, dialect: Dialect) -> Result<DataMap, DbMergeError> {
    let mut loader = DdlLoader::new("ddl", dialect);
    loader.load(Path::new("<inline>"), sql)?;
    loader.finish()
}

fn tokenize(sql: &str, dialect: Dialect) -> Result<Vec<Token>, String> {
    let tokenizer_dialect: Box<dyn sql_dialect::Dialect> = match dialect {
        Dialect::MySql => Box::new(sql_dialect::MySqlDialect {}),
        Dialect::SqlServer => Box::new(sql_dialect::MsSqlDialect {}),
        Dialect::Postgres => Box::new(sql_dialect::PostgreSqlDialect {}),
        _ => Box::new(sql_dialect::GenericDialect {}),
    };
    let tokens = Tokenizer::new(tokenizer_dialect.as_ref(), sql)
        .tokenize()
        .map_err(|e| e.to_string())?;
    Ok(tokens
        .into_iter()
        .filter(|t| !matches!(t, Token::Whitespace(_) | Token::EOF))
        .collect())
}

/// Splits on `;` and on batch separators (`GO`)
fn split_statements(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut statements = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        let separator = match &token {
            Token::SemiColon => true,
            Token::Word(w) => w.quote_style.is_none() && w.value.eq_ignore_ascii_case("GO"),
            _ => false,
        };
        if separator {
            if !current.is_empty() {
                statements.push(std::mem::take(&mut current));
            }
        } else {
            current.push(token);
        }
    }
    if !current.is_empty() {
        statements.push(current);
    }
    statements
}

/// Position in one statement's tokens, whitespace already removed
struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn advance_by(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.tokens.len());
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek() == Some(expected)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        let found = self.check(expected);
        if found {
            self.advance();
        }
        found
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.keyword == keyword)
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        let found = self.check_keyword(keyword);
        if found {
            self.advance();
        }
        found
    }

    /// Unquoted word, compared case-insensitively
    fn check_word(&self, word: &str) -> bool {
        self.peek_word_at(0, word)
    }

    fn peek_word_at(&self, offset: usize, word: &str) -> bool {
        matches!(
            self.tokens.get(self.pos + offset),
            Some(Token::Word(w)) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(word)
        )
    }

    fn eat_word(&mut self, word: &str) -> bool {
        let found = self.check_word(word);
        if found {
            self.advance();
        }
        found
    }

    fn ident(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token::Word(w)) => {
                let value = w.value.clone();
                self.advance();
                Some(value)
            }
            _ => None,
        }
    }

    /// `[catalog.][schema.]name`, returning the schema part when present
    fn object_name(&mut self) -> Option<(Option<String>, String)> {
        let mut parts = vec![self.ident()?];
        while self.eat(&Token::Period) {
            parts.push(self.ident()?);
        }
        let name = parts.pop()?;
        Some((parts.pop(), name))
    }

    /// `(a [ASC|DESC], b ...)`
    fn ident_list(&mut self) -> Option<Vec<String>> {
        if !self.eat(&Token::LParen) {
            return None;
        }
        let mut names = Vec::new();
        loop {
            names.push(self.ident()?);
            while !self.is_at_end() && !self.check(&Token::Comma) && !self.check(&Token::RParen) {
                self.advance();
            }
            if self.eat(&Token::RParen) {
                return Some(names);
            }
            if !self.eat(&Token::Comma) {
                return None;
            }
        }
    }

    /// Skips a balanced parenthesized group if one starts here
    fn skip_group(&mut self) {
        if !self.check(&Token::LParen) {
            return;
        }
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// True at a `,` or `)` that ends the current table element
    fn at_element_end(&self) -> bool {
        self.is_at_end() || self.check(&Token::Comma) || self.check(&Token::RParen)
    }

    /// Skips to the end of the current table element
    fn skip_element(&mut self) {
        while !self.at_element_end() {
            if self.check(&Token::LParen) {
                self.skip_group();
            } else {
                self.advance();
            }
        }
    }

    fn describe(&self) -> String {
        self.tokens
            .iter()
            .take(4)
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
