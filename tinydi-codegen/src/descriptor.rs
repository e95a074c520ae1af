use crate::symbol::Location;
use crate::type_ref::TypeRef;

/// One scanned injectable constructor.
///
/// `parameters` keeps declaration order; it fixes both the argument order of
/// the generated factory and the order dependencies are resolved in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectDescriptor {
    pub target: TypeRef,
    pub constructor: String,
    pub parameters: Vec<TypeRef>,
    pub location: Location,
}

impl InjectDescriptor {
    pub fn new(
        target: TypeRef,
        constructor: impl Into<String>,
        parameters: Vec<TypeRef>,
        location: Location,
    ) -> Self {
        Self {
            target,
            constructor: constructor.into(),
            parameters,
            location,
        }
    }

    /// `<Name>Factory`, placed next to the target type.
    pub fn factory_name(&self) -> String {
        format!("{}Factory", self.target.name())
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}
