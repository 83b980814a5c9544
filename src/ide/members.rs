//! Grouped member listings for the members view.

use smol_str::SmolStr;

use crate::resolver::InheritanceResolver;
use crate::syntax::{Composition, Method, Variable};
use crate::workspace::{ShaderIndex, ShaderUnit};

/// Members contributed by one definer, streams split out from plain
/// variables.
#[derive(Clone, Debug)]
pub struct MemberGroup {
    pub definer: SmolStr,
    pub is_local: bool,
    pub streams: Vec<Variable>,
    pub variables: Vec<Variable>,
    pub methods: Vec<Method>,
    pub compositions: Vec<Composition>,
}

impl MemberGroup {
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
            && self.variables.is_empty()
            && self.methods.is_empty()
            && self.compositions.is_empty()
    }
}

/// Member groups for a unit: the unit's own members first (tagged local),
/// then one group per chain unit in distance order.
pub(super) fn members(
    index: &ShaderIndex,
    resolver: &InheritanceResolver,
    unit: &ShaderUnit,
) -> Vec<MemberGroup> {
    let mut definers = vec![(unit.name.clone(), true)];
    for base in &resolver.resolve_chain(&unit.name).order {
        definers.push((base.clone(), false));
    }

    let mut groups = Vec::new();
    for (definer, is_local) in definers {
        let Some(decl) = index.get_parsed(&definer) else {
            continue;
        };
        let (streams, variables): (Vec<_>, Vec<_>) = decl
            .variables
            .iter()
            .cloned()
            .partition(|v| v.qualifiers.stream);
        let group = MemberGroup {
            definer,
            is_local,
            streams,
            variables,
            methods: decl.methods.clone(),
            compositions: decl.compositions.clone(),
        };
        if !group.is_empty() {
            groups.push(group);
        }
    }
    groups
}
