//! Parser for generic signatures.

use crate::{
    classfile::descriptor::{internal_to_binary, Primitive},
    file::parser::Parser,
    signature::types::{ClassSignature, GenericTypeToken, MethodSignature, TypeVariableToken},
    Error::{MalformedSignature, RecursionLimit},
    Result,
};

/// Default nesting limit for type arguments and array components.
pub const MAX_RECURSION_DEPTH: usize = 50;

/// Recursive descent tokenizer for the generic signature grammar.
///
/// ```text
/// ClassSignature     = [TypeParameters] ClassTypeSignature {ClassTypeSignature}
/// MethodSignature    = [TypeParameters] '(' {JavaType} ')' Result {'^' ThrowsType}
/// TypeParameters     = '<' Identifier ':' [Reference] {':' Reference} ... '>'
/// Reference          = ClassType | 'T' Identifier ';' | '[' JavaType
/// ClassType          = 'L' Name [TypeArgs] {'.' Identifier [TypeArgs]} ';'
/// TypeArgs           = '<' ('*' | ['+' | '-'] Reference)+ '>'
/// ```
pub struct SignatureParser<'a> {
    source: &'a str,
    parser: Parser<'a>,
    depth: usize,
    max_depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a parser over `signature` with the default nesting limit.
    #[must_use]
    pub fn new(signature: &'a str) -> Self {
        Self::with_max_depth(signature, MAX_RECURSION_DEPTH)
    }

    /// Create a parser over `signature` with a custom nesting limit.
    #[must_use]
    pub fn with_max_depth(signature: &'a str, max_depth: usize) -> Self {
        SignatureParser {
            source: signature,
            parser: Parser::new(signature.as_bytes()),
            depth: 0,
            max_depth,
        }
    }

    /// Parse a class signature.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedSignature`] or [`crate::Error::RecursionLimit`].
    pub fn parse_class_signature(&mut self) -> Result<ClassSignature> {
        let type_variables = self.type_parameters()?;
        let super_class = self.class_type()?;
        let mut interfaces = Vec::new();
        while self.parser.has_more_data() {
            interfaces.push(self.class_type()?);
        }

        Ok(ClassSignature {
            type_variables,
            super_class,
            interfaces,
        })
    }

    /// Parse a method signature.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedSignature`] or [`crate::Error::RecursionLimit`].
    pub fn parse_method_signature(&mut self) -> Result<MethodSignature> {
        let type_variables = self.type_parameters()?;

        self.expect(b'(')?;
        let mut parameters = Vec::new();
        while self.peek()? != b')' {
            parameters.push(self.java_type()?);
        }
        self.expect(b')')?;

        let return_type = if self.peek()? == b'V' {
            self.next()?;
            GenericTypeToken::Primitive(Primitive::Void)
        } else {
            self.java_type()?
        };

        let mut exceptions = Vec::new();
        while self.parser.has_more_data() {
            self.expect(b'^')?;
            let exception = match self.peek()? {
                b'T' => self.reference_type()?,
                _ => self.class_type()?,
            };
            exceptions.push(exception);
        }

        Ok(MethodSignature {
            type_variables,
            parameters,
            return_type,
            exceptions,
        })
    }

    /// Parse a field signature, which is a single reference type.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedSignature`] or [`crate::Error::RecursionLimit`].
    pub fn parse_field_signature(&mut self) -> Result<GenericTypeToken> {
        let token = self.reference_type()?;
        if self.parser.has_more_data() {
            return Err(self.malformed("trailing data after field signature"));
        }
        Ok(token)
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeVariableToken>> {
        let mut type_variables = Vec::new();
        if self.peek()? != b'<' {
            return Ok(type_variables);
        }
        self.next()?;

        while self.peek()? != b'>' {
            let symbol = self.identifier(b":")?.to_string();
            self.expect(b':')?;

            let mut bounds = Vec::new();
            if matches!(self.peek()?, b'L' | b'T' | b'[') {
                bounds.push(self.reference_type()?);
            }
            while self.peek()? == b':' {
                self.next()?;
                bounds.push(self.reference_type()?);
            }
            if bounds.is_empty() {
                return Err(self.malformed(&format!("type variable {symbol} has no bound")));
            }

            type_variables.push(TypeVariableToken { symbol, bounds });
        }
        self.next()?;

        if type_variables.is_empty() {
            return Err(self.malformed("empty type parameter list"));
        }
        Ok(type_variables)
    }

    fn java_type(&mut self) -> Result<GenericTypeToken> {
        let code = self.peek()?;
        match Primitive::from_descriptor(code) {
            Some(Primitive::Void) => Err(self.malformed("void is not a value type")),
            Some(primitive) => {
                self.next()?;
                Ok(GenericTypeToken::Primitive(primitive))
            }
            None => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Result<GenericTypeToken> {
        self.depth += 1;
        if self.depth >= self.max_depth {
            return Err(RecursionLimit(self.max_depth));
        }

        let token = match self.peek()? {
            b'L' => self.class_type()?,
            b'T' => {
                self.next()?;
                let symbol = self.identifier(b";")?.to_string();
                self.expect(b';')?;
                GenericTypeToken::TypeVariable(symbol)
            }
            b'[' => {
                self.next()?;
                GenericTypeToken::GenericArray(Box::new(self.java_type()?))
            }
            other => {
                return Err(self.malformed(&format!(
                    "unexpected '{}' where a reference type was expected",
                    char::from(other)
                )))
            }
        };

        self.depth -= 1;
        Ok(token)
    }

    fn class_type(&mut self) -> Result<GenericTypeToken> {
        self.expect(b'L')?;

        let mut name = internal_to_binary(self.identifier(b";<.")?);
        let arguments = self.type_arguments()?;
        let mut token = if arguments.is_empty() {
            GenericTypeToken::Raw(name.clone())
        } else {
            GenericTypeToken::Parameterized {
                name: name.clone(),
                arguments,
                owner: None,
            }
        };

        while self.peek()? == b'.' {
            self.next()?;
            let inner = self.identifier(b";<./")?;
            name = format!("{name}${inner}");
            let arguments = self.type_arguments()?;

            let generic_owner = matches!(token, GenericTypeToken::Parameterized { .. });
            token = if generic_owner || !arguments.is_empty() {
                GenericTypeToken::Parameterized {
                    name: name.clone(),
                    arguments,
                    owner: Some(Box::new(token)),
                }
            } else {
                GenericTypeToken::Raw(name.clone())
            };
        }

        self.expect(b';')?;
        Ok(token)
    }

    fn type_arguments(&mut self) -> Result<Vec<GenericTypeToken>> {
        let mut arguments = Vec::new();
        if self.peek()? != b'<' {
            return Ok(arguments);
        }
        self.next()?;

        while self.peek()? != b'>' {
            let argument = match self.peek()? {
                b'*' => {
                    self.next()?;
                    GenericTypeToken::UnboundWildcard
                }
                b'+' => {
                    self.next()?;
                    GenericTypeToken::UpperBoundWildcard(Box::new(self.reference_type()?))
                }
                b'-' => {
                    self.next()?;
                    GenericTypeToken::LowerBoundWildcard(Box::new(self.reference_type()?))
                }
                _ => self.reference_type()?,
            };
            arguments.push(argument);
        }
        self.next()?;

        if arguments.is_empty() {
            return Err(self.malformed("empty type argument list"));
        }
        Ok(arguments)
    }

    fn identifier(&mut self, terminators: &[u8]) -> Result<&'a str> {
        let start = self.parser.pos();
        while self.parser.has_more_data() {
            let byte = self.peek()?;
            if terminators.contains(&byte) {
                break;
            }
            if matches!(byte, b'<' | b'>' | b';' | b'[' | b':' | b'.') {
                return Err(self.malformed(&format!(
                    "illegal character '{}' in identifier",
                    char::from(byte)
                )));
            }
            self.next()?;
        }

        let end = self.parser.pos();
        if start == end {
            return Err(self.malformed("empty identifier"));
        }
        Ok(&self.source[start..end])
    }

    fn peek(&self) -> Result<u8> {
        self.parser
            .peek_byte()
            .map_err(|_| self.malformed("unexpected end of signature"))
    }

    fn next(&mut self) -> Result<u8> {
        self.parser
            .read_be::<u8>()
            .map_err(|_| self.malformed("unexpected end of signature"))
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        let found = self.next()?;
        if found != expected {
            return Err(self.malformed(&format!(
                "expected '{}' but found '{}'",
                char::from(expected),
                char::from(found)
            )));
        }
        Ok(())
    }

    fn malformed(&self, reason: &str) -> crate::Error {
        MalformedSignature(format!(
            "{} at offset {} in {}",
            reason,
            self.parser.pos(),
            self.source
        ))
    }
}
