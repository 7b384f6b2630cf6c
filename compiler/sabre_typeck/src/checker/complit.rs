//! Composite literal typing.
//!
//! The literal's type comes from its written signature or from the
//! expected type in context. Fields are positional or keyed with `.name`
//! selectors; each selector index may be assigned at most once.

use crate::checker::Typer;
use crate::symbol::AddressMode;
use rustc_hash::FxHashMap;
use sabre_ir::{ComplitField, ExprId, Loc, TypeSign};
use sabre_types::{TypeData, TypeId, Value};

impl Typer<'_> {
    pub(crate) fn resolve_complit_expr(
        &mut self,
        e: ExprId,
        sign: &TypeSign,
        fields: &[ComplitField],
        loc: Loc,
    ) -> TypeId {
        let mut ty = if !sign.is_empty() {
            self.resolve_type_sign(sign, loc.file)
        } else {
            match self.expected_expr_type() {
                Some(expected) => expected,
                None => {
                    self.err(loc, "could not infer composite literal type");
                    TypeId::VOID
                }
            }
        };

        let mut is_const = true;
        let mut next_index: i64 = 0;
        let mut referenced: FxHashMap<i64, usize> = FxHashMap::default();
        let mut selector_indices: Vec<i64> = Vec::with_capacity(fields.len());

        for field in fields {
            let value_loc = self.pkg().ast.expr(field.value).loc;
            let mut failed = false;
            let mut slot_type = ty;
            let mut selector_index: i64 = -1;

            if let Some(selector) = field.selector {
                let selector_loc = Loc::new(loc.file, selector.span);
                match self.resolve_selector(ty, selector.name) {
                    Some((index, slot)) => {
                        selector_index = index;
                        slot_type = slot;
                    }
                    None => {
                        let shown = self.display(ty);
                        let name = self.unit.strings.lookup(selector.name);
                        self.err(
                            selector_loc,
                            format!("type '{shown}' doesn't have field '{name}'"),
                        );
                        break;
                    }
                }
            } else {
                enum Positional {
                    Slot(TypeId),
                    TooMany(usize),
                    NoFields,
                }
                let outcome = match self.unit.types.data(ty) {
                    TypeData::Vec { base, width } => {
                        if next_index < *width as i64 {
                            Positional::Slot(*base)
                        } else {
                            Positional::TooMany(*width as usize)
                        }
                    }
                    TypeData::Struct { fields: struct_fields, .. } => {
                        if (next_index as usize) < struct_fields.len() {
                            Positional::Slot(struct_fields[next_index as usize].ty)
                        } else {
                            Positional::TooMany(struct_fields.len())
                        }
                    }
                    // Unbounded arrays take their element count from the
                    // literal itself.
                    TypeData::Array { base, count } => {
                        if *count < 0 || next_index < *count {
                            Positional::Slot(*base)
                        } else {
                            Positional::TooMany(*count as usize)
                        }
                    }
                    _ => Positional::NoFields,
                };
                match outcome {
                    Positional::Slot(slot) => {
                        slot_type = slot;
                        selector_index = next_index;
                        next_index += 1;
                    }
                    Positional::TooMany(count) => {
                        let shown = self.display(ty);
                        self.err(
                            value_loc,
                            format!("type '{shown}' contains only {count} fields"),
                        );
                        failed = true;
                    }
                    Positional::NoFields => {
                        let shown = self.display(ty);
                        self.err(value_loc, format!("type '{shown}' doesn't have fields"));
                        failed = true;
                    }
                }
            }

            if !failed {
                if let Some(&_first) = referenced.get(&selector_index) {
                    let where_loc = field
                        .selector
                        .map(|s| Loc::new(loc.file, s.span))
                        .unwrap_or(value_loc);
                    self.err(where_loc, "duplicate field name in composite literal");
                } else {
                    referenced.insert(selector_index, selector_indices.len());
                }
            }

            let expected = if field.selector.is_some() && !failed {
                Some(slot_type)
            } else {
                self.peel_top_type(ty)
            };
            let value_type = match expected {
                Some(expected) => {
                    self.with_expected(Some(expected), |t| t.resolve_expr(field.value))
                }
                None => self.resolve_expr(field.value),
            };

            is_const &= self.mode(field.value) == AddressMode::Const
                && self.value(field.value).is_some();

            if !failed {
                let value_vec = self.vec_parts(value_type);
                let target_vec = self.vec_parts(ty);
                if field.selector.is_none() && target_vec.is_some() && value_vec.is_some() {
                    // Smaller vectors may fill several positional slots:
                    // vec4{pos.xyz, 1.0}.
                    let (target_base, target_width) = target_vec.unwrap();
                    let (value_base, value_width) = value_vec.unwrap();
                    if value_width <= target_width
                        && self.unit.types.types_equal(value_base, target_base)
                    {
                        next_index += value_width as i64 - 1;
                    } else {
                        let (a, b) = (self.display(ty), self.display(value_type));
                        self.err(
                            value_loc,
                            format!(
                                "type mismatch in compound literal value, type '{a}' cannot be constructed from '{b}'"
                            ),
                        );
                        break;
                    }
                } else if self.unit.types.is_unbounded_array(slot_type)
                    && self.unit.types.is_bounded_array(value_type)
                {
                    // Bounded arrays flow into unbounded slots; the size
                    // travels with the value.
                } else if !self.can_assign(slot_type, field.value) {
                    let (a, b) = (self.display(slot_type), self.display(value_type));
                    self.err(
                        value_loc,
                        format!(
                            "type mismatch in compound literal value, selector type '{a}' but expression type is '{b}'"
                        ),
                    );
                    break;
                }
            }

            selector_indices.push(selector_index);
        }

        // An unbounded array literal's count is however many elements it
        // got.
        if self.unit.types.is_unbounded_array(ty) {
            if let TypeData::Array { base, .. } = self.unit.types.data(ty) {
                let base = *base;
                ty = self.unit.types.array(base, next_index);
            }
        }

        if is_const {
            let slots = match self.unit.types.data(ty) {
                TypeData::Vec { width, .. } => Some(*width as usize),
                TypeData::Array { count, .. } if *count >= 0 => Some(*count as usize),
                TypeData::Struct { fields: struct_fields, .. } => Some(struct_fields.len()),
                _ => None,
            };
            if let Some(slots) = slots {
                let mut aggregate = Value::aggregate(ty, slots);
                for (field, &selector_index) in fields.iter().zip(&selector_indices) {
                    if selector_index < 0 {
                        continue;
                    }
                    if let Some(value) = self.value(field.value) {
                        aggregate.aggregate_set(selector_index as usize, value);
                    }
                }
                self.set_value(e, aggregate);
                self.set_mode(e, AddressMode::Const);
            }
        }

        ty
    }

    /// Resolve a `.name` selector against a vector or struct type.
    fn resolve_selector(&self, ty: TypeId, name: sabre_ir::Name) -> Option<(i64, TypeId)> {
        match self.unit.types.data(ty) {
            TypeData::Vec { base, width } => {
                let text = self.unit.strings.lookup(name);
                let index = match text {
                    "x" if *width > 0 => 0,
                    "y" if *width > 1 => 1,
                    "z" if *width > 2 => 2,
                    "w" if *width > 3 => 3,
                    _ => return None,
                };
                Some((index, *base))
            }
            TypeData::Struct { fields, fields_by_name, .. } => fields_by_name
                .get(&name)
                .map(|&index| (index as i64, fields[index].ty)),
            _ => None,
        }
    }
}
