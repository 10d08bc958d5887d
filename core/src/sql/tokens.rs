/// SQL keywords, operators and punctuation.
///
/// Multi-word keywords (`ORDER BY`, `LEFT JOIN`, ...) are single tokens so the
/// spacing rules never have to look further than one neighbour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
pub enum Token {
    // Statements and clauses
    SELECT,
    DISTINCT,
    FROM,
    WHERE,
    ORDER_BY,
    LIMIT,
    OFFSET,
    WITH,
    RECURSIVE,
    AS,
    ON,
    UNION,

    // Joins
    INNER_JOIN,
    LEFT_JOIN,
    CROSS_JOIN,

    // Ordering
    ASC,
    DESC,

    // Logic
    AND,
    OR,
    NOT,
    IS,
    NULL,
    IN,
    LIKE,

    // Comparison
    EQ,
    NE,
    LT,
    GT,
    LE,
    GE,

    // Punctuation
    LPAREN,
    RPAREN,
    COMMA,
    DOT,
    STAR,
}

impl Token {
    /// The rendered text of this token.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Token::SELECT => "SELECT",
            Token::DISTINCT => "DISTINCT",
            Token::FROM => "FROM",
            Token::WHERE => "WHERE",
            Token::ORDER_BY => "ORDER BY",
            Token::LIMIT => "LIMIT",
            Token::OFFSET => "OFFSET",
            Token::WITH => "WITH",
            Token::RECURSIVE => "RECURSIVE",
            Token::AS => "AS",
            Token::ON => "ON",
            Token::UNION => "UNION",
            Token::INNER_JOIN => "INNER JOIN",
            Token::LEFT_JOIN => "LEFT JOIN",
            Token::CROSS_JOIN => "CROSS JOIN",
            Token::ASC => "ASC",
            Token::DESC => "DESC",
            Token::AND => "AND",
            Token::OR => "OR",
            Token::NOT => "NOT",
            Token::IS => "IS",
            Token::NULL => "NULL",
            Token::IN => "IN",
            Token::LIKE => "LIKE",
            Token::EQ => "=",
            Token::NE => "<>",
            Token::LT => "<",
            Token::GT => ">",
            Token::LE => "<=",
            Token::GE => ">=",
            Token::LPAREN => "(",
            Token::RPAREN => ")",
            Token::COMMA => ",",
            Token::DOT => ".",
            Token::STAR => "*",
        }
    }

    /// Comparison operators get a space on both sides.
    pub const fn is_operator(&self) -> bool {
        matches!(
            self,
            Token::EQ | Token::NE | Token::LT | Token::GT | Token::LE | Token::GE
        )
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
