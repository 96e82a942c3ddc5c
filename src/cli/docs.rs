//! Documentation content for the graphnav CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Navigation,
    Collections,
    Types,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "navigation" | "nav" | "properties" => Some(Self::Navigation),
            "collections" | "projection" | "selection" => Some(Self::Collections),
            "types" | "type" | "numbers" => Some(Self::Types),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"GRAPHNAV DOCUMENTATION

Graphnav expressions navigate an object graph: read properties, index into
collections, call methods, and combine the results with operators. The JSON
document given to `graphnav eval` becomes the root.

DOCUMENTATION CATEGORIES

  syntax            Literals, variables, #this and #root
  operators         Precedence table, logical, arithmetic, bitwise, membership
  navigation        Properties, indexes, dynamic subscripts, method calls
  collections       List and map literals, projection, selection
  types             Numeric promotion, truthiness, static members, new

QUICK REFERENCE

  name              Property of the current object
  a.b.c             Chained navigation
  items[0]          Index
  items[#LAST]      Dynamic subscript (#FIRST #MID #LAST #ALL)
  #var              Variable
  a = b, c          Assignment, sequence
  .{ expr }         Projection
  .{? cond }        Selection

Run 'graphnav docs <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Navigation) => Ok(NAVIGATION_DOC),
        Some(DocCategory::Collections) => Ok(COLLECTIONS_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Literals and References

LITERALS
  42  42L  0x1F  017        int, long, hex, octal
  2.5  2.5F  2D             double, float, double
  7B  1.25H                 big integer, big decimal
  "text"  'text'            strings
  'c'                       a single-quoted single character is a char
  true  false  null

REFERENCES
  #name                     Variable; undefined variables read as null
  #this                     The value the current step is evaluated against
  #root                     The expression root (assignable)

  Example:
    Input:  {"price": 10}
    Expr:   #qty = 3, price * #qty
    Output: 30

SEQUENCES
  a, b, c
    Evaluates every expression in order and yields the last.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Lowest Precedence First

  ,                         sequence
  =                         assignment (right associative)
  ? :                       conditional
  ||  or                    logical OR, yields the deciding operand
  &&  and                   logical AND, yields the deciding operand
  |   bor                   bitwise OR (logical on two booleans)
  ^   xor                   bitwise XOR
  &   band                  bitwise AND
  ==  !=  eq  neq           equality (numeric across types: 1 == 1.0)
  <  >  <=  >=  lt gt lte gte, in, not in
  <<  >>  >>>  shl shr ushr
  +  -                      + concatenates when either side is a string
  *  /  %
  -  +  !  not  ~  bnot      prefix; `instanceof Class` postfix

  Constraints:
    - Integer division and remainder by zero fail
    - Floating division by zero yields Infinity or NaN
    - Comparisons involving NaN are false
"#;

const NAVIGATION_DOC: &str = r#"NAVIGATION - Properties, Indexes and Calls

PROPERTIES
  bean.name
    Reads getName(), isName() or hasName(), then a field called name.
    Writing uses setName(value) or a writable field.

INDEXES
  items[0]  map["key"]  array.length
  items[#FIRST]  items[#MID]  items[#LAST]  items[#ALL]
  items[^]  items[|]  items[$]  items[*]

  A dynamic subscript against an empty collection reads null and ignores
  writes. A plain index outside the collection is an error.

METHODS
  bean.lookup(key)
    Arguments are evaluated against the root, not the current object.
    Overloads are picked by lowest conversion cost: exact, boxing, widening,
    subtype, Object, collection/array reshaping, varargs packing.

STATIC MEMBERS
  @Math@max(a, b)  @Math@PI
"#;

const COLLECTIONS_DOC: &str = r#"COLLECTIONS - Literals, Projection and Selection

LITERALS
  {1, 2, 3}                 list
  #{"a": 1, "b": 2}         map
  new int[3]                array of three zeros
  new int[] {1, 2, 3}       array from an initializer

PROJECTION
  orders.{ amount }
    Evaluates the expression with each element as #this and collects the
    results in a list. Maps project over {key, value} entries.

SELECTION
  orders.{? paid }          every element the condition holds for
  orders.{^ paid }          the first such element, as a list
  orders.{$ paid }          the last such element, as a list
"#;

const TYPES_DOC: &str = r#"TYPES - Numbers, Truthiness, Construction

NUMERIC PROMOTION
  BigDecimal with anything            BigDecimal
  BigInteger with float/double        BigDecimal
  BigInteger with integral            BigInteger
  double with non-big                 double
  float with integral                 float
  long with integral                  long
  otherwise                           int

  int and long arithmetic wraps on overflow; big integer overflow fails.

TRUTHINESS
  null, false, numeric zero of any type and '\0' are false. Everything else
  is true, including "" and empty collections.

CONSTRUCTION AND TYPE TESTS
  new ArrayList()
  value instanceof String
"#;
