//! Recursive-descent `.proto` parser. Single-token lookahead,
//! diagnostics-accumulating: a syntax error is recorded and parsing
//! resynchronizes at the next `;` or `}` rather than aborting the file.

use protobuf::reflect::ScalarType;

use crate::ast::*;
use crate::diagnostics::{Diagnostic, Loc};
use crate::lexer::{LexError, ProtoLexer, Token};

pub struct Parser<'a> {
    lexer: ProtoLexer<'a>,
    diagnostics: Vec<Diagnostic>,
}

fn scalar_keyword(s: &str) -> Option<ScalarType> {
    use ScalarType::*;
    Some(match s {
        "double" => Double,
        "float" => Float,
        "int32" => Int32,
        "int64" => Int64,
        "uint32" => Uint32,
        "uint64" => Uint64,
        "sint32" => Sint32,
        "sint64" => Sint64,
        "fixed32" => Fixed32,
        "fixed64" => Fixed64,
        "sfixed32" => Sfixed32,
        "sfixed64" => Sfixed64,
        "bool" => Bool,
        "string" => String,
        "bytes" => Bytes,
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Parser<'a> {
        Parser { lexer: ProtoLexer::new(source), diagnostics: Vec::new() }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn loc(&mut self) -> Loc {
        self.lexer.loc()
    }

    fn error(&mut self, message: impl Into<std::string::String>) {
        let loc = self.loc();
        self.diagnostics.push(Diagnostic::error(loc, message));
    }

    fn next_token(&mut self) -> Option<(Token<'a>, Loc)> {
        match self.lexer.advance() {
            Ok(t) => t,
            Err(e) => {
                self.push_lex_error(e);
                None
            }
        }
    }

    fn push_lex_error(&mut self, e: LexError) {
        let loc = self.loc();
        self.diagnostics.push(Diagnostic::error(loc, e.to_string()));
    }

    fn peek(&mut self) -> Option<Token<'a>> {
        match self.lexer.peek() {
            Ok(t) => t.cloned(),
            Err(e) => {
                self.push_lex_error(e);
                None
            }
        }
    }

    fn is_eof(&mut self) -> bool {
        self.peek().is_none()
    }

    fn is_symbol(&mut self, c: char) -> bool {
        matches!(self.peek(), Some(Token::Symbol(s)) if s == c)
    }

    fn is_ident(&mut self, s: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(i)) if i == s)
    }

    fn eat_symbol(&mut self, c: char) -> bool {
        if self.is_symbol(c) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, c: char) -> bool {
        if self.eat_symbol(c) {
            true
        } else {
            self.error(format!("expected '{}'", c));
            false
        }
    }

    fn eat_ident(&mut self, s: &str) -> bool {
        if self.is_ident(s) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn next_ident(&mut self) -> std::string::String {
        match self.next_token() {
            Some((Token::Ident(s), _)) => s.to_owned(),
            _ => {
                self.error("expected identifier");
                std::string::String::new()
            }
        }
    }

    fn next_str_lit(&mut self) -> std::string::String {
        match self.next_token() {
            Some((Token::StrLit(s), _)) => s.into_owned(),
            _ => {
                self.error("expected string literal");
                std::string::String::new()
            }
        }
    }

    fn next_int(&mut self) -> i64 {
        let negative = self.eat_symbol('-');
        match self.next_token() {
            Some((Token::IntLit(v), _)) => {
                if negative {
                    -(v as i64)
                } else {
                    v as i64
                }
            }
            _ => {
                self.error("expected integer literal");
                0
            }
        }
    }

    /// Reads a dotted type reference: an optional leading `.` followed by
    /// `ident(.ident)*`. Leaves the leading dot in the returned string so
    /// the linker can tell an absolute reference from a relative one.
    fn dotted_name(&mut self) -> std::string::String {
        let mut out = std::string::String::new();
        if self.eat_symbol('.') {
            out.push('.');
        }
        out.push_str(&self.next_ident());
        while self.is_symbol('.') {
            self.next_token();
            out.push('.');
            out.push_str(&self.next_ident());
        }
        out
    }

    fn type_ref(&mut self) -> TypeRef {
        if let Some(Token::Ident(name)) = self.peek() {
            if let Some(scalar) = scalar_keyword(name) {
                self.next_token();
                return TypeRef::Scalar(scalar);
            }
        }
        TypeRef::Named(self.dotted_name())
    }

    /// Skips a balanced `{ ... }` block (used for proto2 `group` bodies and
    /// opaque option aggregates); the opening `{` must already be consumed.
    fn skip_balanced_braces(&mut self) {
        let mut depth = 1;
        while depth > 0 {
            match self.next_token() {
                Some((Token::Symbol('{'), _)) => depth += 1,
                Some((Token::Symbol('}'), _)) => depth -= 1,
                Some(_) => {}
                None => break,
            }
        }
    }

    /// Skips tokens until a `;` (consumed) or a `}` (not consumed), used to
    /// resynchronize after a syntax error within a block.
    fn synchronize(&mut self) {
        loop {
            match self.peek() {
                None => break,
                Some(Token::Symbol('}')) => break,
                Some(Token::Symbol(';')) => {
                    self.next_token();
                    break;
                }
                Some(Token::Symbol('{')) => {
                    self.next_token();
                    self.skip_balanced_braces();
                }
                _ => {
                    self.next_token();
                }
            }
        }
    }

    fn constant(&mut self) -> OptionValue {
        match self.peek() {
            Some(Token::Symbol('{')) => {
                self.next_token();
                self.skip_balanced_braces();
                OptionValue::Ident(std::string::String::new())
            }
            Some(Token::StrLit(_)) => OptionValue::Str(self.next_str_lit()),
            Some(Token::Ident(i)) if i == "true" => {
                self.next_token();
                OptionValue::Bool(true)
            }
            Some(Token::Ident(i)) if i == "false" => {
                self.next_token();
                OptionValue::Bool(false)
            }
            Some(Token::Ident(_)) => OptionValue::Ident(self.dotted_name()),
            Some(Token::Symbol('-')) | Some(Token::IntLit(_)) => {
                let negative = self.eat_symbol('-');
                match self.peek() {
                    Some(Token::FloatLit(_)) => {
                        let v = self.next_float_raw();
                        OptionValue::Float(if negative { -v } else { v })
                    }
                    _ => {
                        let v = match self.next_token() {
                            Some((Token::IntLit(v), _)) => v as i64,
                            _ => {
                                self.error("expected number");
                                0
                            }
                        };
                        OptionValue::Int(if negative { -v } else { v })
                    }
                }
            }
            Some(Token::FloatLit(_)) => OptionValue::Float(self.next_float_raw()),
            _ => {
                self.error("expected a constant value");
                OptionValue::Ident(std::string::String::new())
            }
        }
    }

    fn next_float_raw(&mut self) -> f64 {
        match self.next_token() {
            Some((Token::FloatLit(v), _)) => v,
            _ => {
                self.error("expected float literal");
                0.0
            }
        }
    }

    /// `option` name `=` constant `;`, with the leading `option` keyword
    /// already consumed by the caller.
    fn parse_option_body(&mut self) -> Option_ {
        let name = if self.eat_symbol('(') {
            let n = self.dotted_name();
            self.expect_symbol(')');
            while self.is_symbol('.') {
                self.next_token();
                self.next_ident();
            }
            n
        } else {
            self.dotted_name()
        };
        self.expect_symbol('=');
        let value = self.constant();
        Option_ { name, value }
    }

    /// `[` option (`,` option)* `]`, used as the bracketed suffix on fields
    /// and enum values.
    fn bracketed_options(&mut self) -> Vec<Option_> {
        let mut out = Vec::new();
        if !self.eat_symbol('[') {
            return out;
        }
        loop {
            let name = if self.eat_symbol('(') {
                let n = self.dotted_name();
                self.expect_symbol(')');
                n
            } else {
                self.dotted_name()
            };
            self.expect_symbol('=');
            let value = self.constant();
            out.push(Option_ { name, value });
            if !self.eat_symbol(',') {
                break;
            }
        }
        self.expect_symbol(']');
        out
    }

    pub fn parse_file(&mut self) -> File {
        let mut file = File::default();
        if self.is_ident("syntax") {
            self.next_token();
            self.expect_symbol('=');
            let s = self.next_str_lit();
            self.expect_symbol(';');
            file.syntax = match s.as_str() {
                "proto3" => Syntax::Proto3,
                "proto2" => Syntax::Proto2,
                _ => {
                    self.error("unknown syntax, expected \"proto2\" or \"proto3\"");
                    Syntax::Proto2
                }
            };
        } else {
            file.syntax = Syntax::Proto2;
        }
        while !self.is_eof() {
            if self.eat_symbol(';') {
                continue;
            }
            match self.peek() {
                Some(Token::Ident(kw)) if kw == "import" => {
                    self.next_token();
                    file.imports.push(self.parse_import());
                }
                Some(Token::Ident(kw)) if kw == "package" => {
                    self.next_token();
                    file.package = Some(self.dotted_name());
                    self.expect_symbol(';');
                }
                Some(Token::Ident(kw)) if kw == "option" => {
                    self.next_token();
                    file.options.push(self.parse_option_body());
                    self.expect_symbol(';');
                }
                Some(Token::Ident(kw)) if kw == "message" => {
                    self.next_token();
                    file.messages.push(self.parse_message());
                }
                Some(Token::Ident(kw)) if kw == "enum" => {
                    self.next_token();
                    file.enums.push(self.parse_enum());
                }
                Some(Token::Ident(kw)) if kw == "service" => {
                    self.next_token();
                    file.services.push(self.parse_service());
                }
                Some(Token::Ident(kw)) if kw == "extend" => {
                    self.next_token();
                    file.extends.push(self.parse_extend());
                }
                _ => {
                    self.error("expected import, package, option, message, enum, service or extend");
                    self.synchronize();
                }
            }
        }
        file
    }

    fn parse_import(&mut self) -> Import {
        let loc = self.loc();
        let vis = if self.eat_ident("weak") {
            ImportVis::Weak
        } else if self.eat_ident("public") {
            ImportVis::Public
        } else {
            ImportVis::Default
        };
        let path = self.next_str_lit();
        self.expect_symbol(';');
        Import { loc, path, vis }
    }

    fn parse_extend(&mut self) -> Extend {
        let loc = self.loc();
        let extendee = self.dotted_name();
        let mut fields = Vec::new();
        self.expect_symbol('{');
        while !self.is_symbol('}') && !self.is_eof() {
            if self.eat_symbol(';') {
                continue;
            }
            let label = self.parse_label_opt();
            fields.push(self.parse_field(label));
        }
        self.expect_symbol('}');
        Extend { loc, extendee, fields }
    }

    fn parse_label_opt(&mut self) -> Label {
        if self.eat_ident("optional") {
            Label::Optional
        } else if self.eat_ident("required") {
            Label::Required
        } else if self.eat_ident("repeated") {
            Label::Repeated
        } else {
            Label::Implicit
        }
    }

    fn parse_field(&mut self, label: Label) -> Field {
        let loc = self.loc();
        let type_ref = self.type_ref();
        let name = self.next_ident();
        self.expect_symbol('=');
        let number = self.next_int() as i32;
        let options = self.bracketed_options();
        self.expect_symbol(';');
        Field { loc, name, label, type_ref, number, options }
    }

    fn parse_map(&mut self) -> MapField {
        let loc = self.loc();
        self.expect_symbol('<');
        let key_name = self.next_ident();
        let key_type = scalar_keyword(&key_name).unwrap_or(ScalarType::String);
        self.expect_symbol(',');
        let value_type = self.type_ref();
        self.expect_symbol('>');
        let name = self.next_ident();
        self.expect_symbol('=');
        let number = self.next_int() as i32;
        let options = self.bracketed_options();
        self.expect_symbol(';');
        MapField { loc, name, number, key_type, value_type, options }
    }

    fn parse_oneof(&mut self) -> OneOf {
        let name = self.next_ident();
        let mut fields = Vec::new();
        self.expect_symbol('{');
        while !self.is_symbol('}') && !self.is_eof() {
            if self.eat_symbol(';') {
                continue;
            }
            if self.is_ident("option") {
                self.next_token();
                self.parse_option_body();
                self.expect_symbol(';');
                continue;
            }
            fields.push(self.parse_field(Label::Optional));
        }
        self.expect_symbol('}');
        OneOf { name, fields }
    }

    fn parse_reserved(&mut self) -> (Vec<FieldNumberRange>, Vec<std::string::String>) {
        let mut nums = Vec::new();
        let mut names = Vec::new();
        loop {
            if let Some(Token::StrLit(_)) = self.peek() {
                names.push(self.next_str_lit());
            } else {
                let from = self.next_int() as i32;
                let to = if self.eat_ident("to") {
                    if self.eat_ident("max") {
                        i32::MAX
                    } else {
                        self.next_int() as i32
                    }
                } else {
                    from
                };
                nums.push(FieldNumberRange { from, to });
            }
            if !self.eat_symbol(',') {
                break;
            }
        }
        self.expect_symbol(';');
        (nums, names)
    }

    fn parse_message(&mut self) -> Message {
        let loc = Some(self.loc());
        let name = self.next_ident();
        let mut message = Message { loc, name, ..Message::default() };
        self.expect_symbol('{');
        while !self.is_symbol('}') && !self.is_eof() {
            if self.eat_symbol(';') {
                continue;
            }
            match self.peek() {
                Some(Token::Ident(kw)) if kw == "message" => {
                    self.next_token();
                    message.messages.push(self.parse_message());
                }
                Some(Token::Ident(kw)) if kw == "enum" => {
                    self.next_token();
                    message.enums.push(self.parse_enum());
                }
                Some(Token::Ident(kw)) if kw == "oneof" => {
                    self.next_token();
                    message.fields.push(FieldOrOneOf::OneOf(self.parse_oneof()));
                }
                Some(Token::Ident(kw)) if kw == "map" => {
                    self.next_token();
                    message.fields.push(FieldOrOneOf::Map(self.parse_map()));
                }
                Some(Token::Ident(kw)) if kw == "reserved" => {
                    self.next_token();
                    let (nums, names) = self.parse_reserved();
                    message.reserved_nums.extend(nums);
                    message.reserved_names.extend(names);
                }
                Some(Token::Ident(kw)) if kw == "extensions" => {
                    self.next_token();
                    self.synchronize();
                }
                Some(Token::Ident(kw)) if kw == "extend" => {
                    self.next_token();
                    self.parse_extend();
                }
                Some(Token::Ident(kw)) if kw == "option" => {
                    self.next_token();
                    message.options.push(self.parse_option_body());
                    self.expect_symbol(';');
                }
                Some(Token::Ident(kw)) if kw == "group" => {
                    self.next_token();
                    self.next_ident();
                    self.expect_symbol('=');
                    self.next_int();
                    self.expect_symbol('{');
                    self.skip_balanced_braces();
                }
                Some(Token::Ident(kw)) if kw == "optional" || kw == "required" || kw == "repeated" => {
                    let label = self.parse_label_opt();
                    message.fields.push(FieldOrOneOf::Field(self.parse_field(label)));
                }
                Some(Token::Ident(_)) => {
                    message.fields.push(FieldOrOneOf::Field(self.parse_field(Label::Implicit)));
                }
                _ => {
                    self.error("expected a message member");
                    self.synchronize();
                }
            }
        }
        self.expect_symbol('}');
        message
    }

    fn parse_enum(&mut self) -> Enum {
        let name = self.next_ident();
        let mut e = Enum { name, ..Enum::default() };
        self.expect_symbol('{');
        while !self.is_symbol('}') && !self.is_eof() {
            if self.eat_symbol(';') {
                continue;
            }
            if self.is_ident("option") {
                self.next_token();
                e.options.push(self.parse_option_body());
                self.expect_symbol(';');
                continue;
            }
            if self.is_ident("reserved") {
                self.next_token();
                self.parse_reserved();
                continue;
            }
            let loc = self.loc();
            let vname = self.next_ident();
            self.expect_symbol('=');
            let number = self.next_int() as i32;
            let options = self.bracketed_options();
            self.expect_symbol(';');
            e.values.push(EnumValue { loc, name: vname, number, options });
        }
        self.expect_symbol('}');
        e
    }

    fn parse_service(&mut self) -> Service {
        let name = self.next_ident();
        let mut service = Service { name, methods: Vec::new() };
        self.expect_symbol('{');
        while !self.is_symbol('}') && !self.is_eof() {
            if self.eat_symbol(';') {
                continue;
            }
            if self.is_ident("option") {
                self.next_token();
                self.parse_option_body();
                self.expect_symbol(';');
                continue;
            }
            if !self.eat_ident("rpc") {
                self.error("expected rpc or option");
                self.synchronize();
                continue;
            }
            let loc = self.loc();
            let name = self.next_ident();
            self.expect_symbol('(');
            let client_streaming = self.eat_ident("stream");
            let input_type = self.dotted_name();
            self.expect_symbol(')');
            self.eat_ident("returns");
            self.expect_symbol('(');
            let server_streaming = self.eat_ident("stream");
            let output_type = self.dotted_name();
            self.expect_symbol(')');
            if self.eat_symbol('{') {
                while !self.is_symbol('}') && !self.is_eof() {
                    if self.eat_ident("option") {
                        self.parse_option_body();
                        self.expect_symbol(';');
                    } else {
                        self.next_token();
                    }
                }
                self.expect_symbol('}');
            } else {
                self.expect_symbol(';');
            }
            service.methods.push(Method { loc, name, input_type, output_type, client_streaming, server_streaming });
        }
        self.expect_symbol('}');
        service
    }
}

/// Parses one `.proto` source string, returning the AST and any diagnostics
/// found along the way. The AST is populated even when diagnostics contain
/// errors; callers check [`crate::diagnostics::has_errors`] first.
pub fn parse_file(source: &str) -> (File, Vec<Diagnostic>) {
    let mut parser = Parser::new(source);
    let file = parser.parse_file();
    (file, parser.diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::has_errors;

    #[test]
    fn parses_simple_message() {
        let (file, diags) = parse_file(
            r#"
            syntax = "proto3";
            message Simple {
                int32 value = 1;
                repeated string tags = 2;
            }
            "#,
        );
        assert!(!has_errors(&diags), "{:?}", diags);
        assert_eq!(file.syntax, Syntax::Proto3);
        assert_eq!(file.messages.len(), 1);
        let m = &file.messages[0];
        assert_eq!(m.name, "Simple");
        assert_eq!(m.regular_fields().len(), 2);
    }

    #[test]
    fn parses_oneof_map_and_enum() {
        let (file, diags) = parse_file(
            r#"
            syntax = "proto3";
            enum Color { UNSPECIFIED = 0; RED = 1; }
            message M {
                oneof kind { string name = 1; int32 id = 2; }
                map<string, int32> counts = 3;
                Color color = 4;
            }
            "#,
        );
        assert!(!has_errors(&diags), "{:?}", diags);
        assert_eq!(file.enums[0].values.len(), 2);
        let m = &file.messages[0];
        assert_eq!(m.oneofs().len(), 1);
        assert_eq!(m.maps().len(), 1);
    }

    #[test]
    fn parses_service_with_streaming_methods() {
        let (file, diags) = parse_file(
            r#"
            service UnaryService {
                rpc Ping (PingRequest) returns (PingResponse);
                rpc Watch (WatchRequest) returns (stream WatchResponse);
            }
            "#,
        );
        assert!(!has_errors(&diags), "{:?}", diags);
        let s = &file.services[0];
        assert_eq!(s.methods.len(), 2);
        assert!(!s.methods[0].server_streaming);
        assert!(s.methods[1].server_streaming);
    }

    #[test]
    fn recovers_after_a_syntax_error_in_one_field() {
        let (file, diags) = parse_file(
            r#"
            message M {
                int32 bad_number_missing
                int32 ok = 2;
            }
            "#,
        );
        assert!(has_errors(&diags));
        assert_eq!(file.messages[0].name, "M");
    }

    #[test]
    fn reserved_ranges_and_names() {
        let (file, diags) = parse_file(
            r#"
            message M {
                reserved 1, 2 to 5, 10 to max;
                reserved "foo", "bar";
            }
            "#,
        );
        assert!(!has_errors(&diags), "{:?}", diags);
        let m = &file.messages[0];
        assert_eq!(m.reserved_nums.len(), 3);
        assert_eq!(m.reserved_names, vec!["foo".to_string(), "bar".to_string()]);
    }
}
