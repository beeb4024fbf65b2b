use std::fmt;

pub const FUNCTION_REF_LEN: usize = 24;
pub const SELECTOR_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    String,
    Address,
    /// Dynamic `bytes`.
    Bytes,
    /// `bytesN`, N in 1..=32.
    FixedBytes(usize),
    Int(u16),
    Uint(u16),
    Tuple(Vec<TupleField>),
    FixedArray(usize, Box<ParamType>),
    Array(Box<ParamType>),
    /// External function reference: address followed by selector.
    Function,
    /// Kinds the engine never coerces (`fixedMxN`, `ufixedMxN`, `hash`).
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleField {
    pub name: String,
    pub ty: ParamType,
}

impl ParamType {
    pub fn tuple<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, ParamType)>,
        S: Into<String>,
    {
        ParamType::Tuple(
            fields
                .into_iter()
                .map(|(name, ty)| TupleField {
                    name: name.into(),
                    ty,
                })
                .collect(),
        )
    }

    pub fn array(elem: ParamType) -> Self {
        ParamType::Array(Box::new(elem))
    }

    pub fn fixed_array(len: usize, elem: ParamType) -> Self {
        ParamType::FixedArray(len, Box::new(elem))
    }

    /// Encoded length varies with content.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::String | ParamType::Bytes | ParamType::Array(_) => true,
            ParamType::FixedArray(_, elem) => elem.is_dynamic(),
            ParamType::Tuple(fields) => fields.iter().any(|f| f.ty.is_dynamic()),
            _ => false,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => f.write_str("bool"),
            ParamType::String => f.write_str("string"),
            ParamType::Address => f.write_str("address"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::FixedBytes(n) => write!(f, "bytes{n}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Tuple(fields) => {
                f.write_str("(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", field.ty)?;
                }
                f.write_str(")")
            }
            ParamType::FixedArray(n, elem) => write!(f, "{elem}[{n}]"),
            ParamType::Array(elem) => write!(f, "{elem}[]"),
            ParamType::Function => f.write_str("function"),
            ParamType::Unsupported(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: ParamType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Param {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Lookup name; overloads get a numeric suffix.
    pub name: String,
    /// Name as declared in the schema.
    pub raw_name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub selector: [u8; SELECTOR_LEN],
}

impl Method {
    /// Builds a method whose selector is derived from its canonical signature.
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, outputs: Vec<Param>) -> Self {
        let name = name.into();
        let selector = crate::selector::method_selector(&signature(&name, &inputs));
        Method {
            raw_name: name.clone(),
            name,
            inputs,
            outputs,
            selector,
        }
    }

    /// Canonical signature, e.g. `argTuple((uint256,uint24))`.
    pub fn signature(&self) -> String {
        signature(&self.raw_name, &self.inputs)
    }
}

pub(crate) fn signature(name: &str, inputs: &[Param]) -> String {
    let tys: Vec<String> = inputs.iter().map(|p| p.ty.to_string()).collect();
    format!("{name}({})", tys.join(","))
}
