//! Entry-point validation and GPU resource binding assignment.

use crate::checker::Typer;
use crate::symbol::{EntryMode, SymbolKind};
use crate::unit::PackageId;
use sabre_ir::{DeclKind, Loc};
use sabre_types::{SymRef, TypeData, TypeId};

#[derive(Copy, Clone)]
enum ResourceKind {
    Texture,
    Sampler,
    Uniform,
}

impl ResourceKind {
    const fn noun(self) -> &'static str {
        match self {
            ResourceKind::Texture => "texture",
            ResourceKind::Sampler => "sampler",
            ResourceKind::Uniform => "uniform",
        }
    }
}

impl Typer<'_> {
    // ===== Binding assignment =====

    /// Assign a binding index to a uniform variable, or reuse the one it
    /// already has. Explicit `@uniform{binding = N}` indices advance the
    /// matching generator past `N`; duplicates across symbols of the same
    /// resource kind are errors.
    pub(crate) fn assign_bindings(&mut self, entry: Option<usize>, sym: SymRef) {
        let ty = self.unit.sym(sym).ty.unwrap_or(TypeId::VOID);
        let resource = match self.unit.types.data(ty) {
            TypeData::Texture { .. } => ResourceKind::Texture,
            TypeData::Sampler | TypeData::SamplerState => ResourceKind::Sampler,
            _ => ResourceKind::Uniform,
        };

        let already_processed = matches!(
            self.unit.sym(sym).kind,
            SymbolKind::Var { binding_processed: true, .. }
        );
        if already_processed {
            if let Some(entry) = entry {
                self.attach_to_entry(entry, resource, sym);
            }
            return;
        }
        if let SymbolKind::Var { binding_processed, .. } = &mut self.unit.sym_mut(sym).kind {
            *binding_processed = true;
        }

        let explicit = self.explicit_binding(sym);
        let generator = match resource {
            ResourceKind::Texture => &mut self.texture_binding_gen,
            ResourceKind::Sampler => &mut self.sampler_binding_gen,
            ResourceKind::Uniform => &mut self.uniform_binding_gen,
        };
        let binding = match explicit {
            Some(fixed) => {
                if fixed > *generator {
                    *generator = fixed + 1;
                }
                fixed
            }
            None => {
                let next = *generator;
                *generator += 1;
                next
            }
        };
        if let SymbolKind::Var { binding: slot, .. } = &mut self.unit.sym_mut(sym).kind {
            *slot = Some(binding);
        }

        let map = match resource {
            ResourceKind::Texture => &self.unit.reachable_textures,
            ResourceKind::Sampler => &self.unit.reachable_samplers,
            ResourceKind::Uniform => &self.unit.reachable_uniforms,
        };
        if let Some(&old) = map.get(&binding) {
            let old_loc = self.unit.sym(old).loc();
            let (path, pos) = self.unit.sources.resolve(old_loc.file, old_loc.span);
            let noun = resource.noun();
            let msg = format!(
                "{noun} binding point {binding} is shared with other {noun} defined in {path}:{}",
                pos.line
            );
            let loc = self.unit.sym(sym).loc();
            self.err(loc, msg);
            return;
        }
        match resource {
            ResourceKind::Texture => self.unit.reachable_textures.insert(binding, sym),
            ResourceKind::Sampler => self.unit.reachable_samplers.insert(binding, sym),
            ResourceKind::Uniform => self.unit.reachable_uniforms.insert(binding, sym),
        };
        if let Some(entry) = entry {
            self.attach_to_entry(entry, resource, sym);
        }
    }

    fn attach_to_entry(&mut self, entry: usize, resource: ResourceKind, sym: SymRef) {
        let entry = &mut self.pkg_mut().entry_points[entry];
        let list = match resource {
            ResourceKind::Texture => &mut entry.textures,
            ResourceKind::Sampler => &mut entry.samplers,
            ResourceKind::Uniform => &mut entry.uniforms,
        };
        if !list.contains(&sym) {
            list.push(sym);
        }
    }

    /// The `binding = N` argument of the symbol's `@uniform` tag.
    fn explicit_binding(&self, sym: SymRef) -> Option<i64> {
        let decl = self.unit.sym(sym).decl()?;
        let home = PackageId(sym.package);
        let tags = &self.unit.pkg(home).ast.decl(decl).tags;
        tags.get(self.unit.keywords.uniform)?
            .arg(self.unit.keywords.binding)?
            .value
            .as_int()
    }

    // ===== Uniform type legality =====

    /// Textures and samplers are only legal at the top level of a uniform;
    /// aggregates recurse; unbounded arrays never fit.
    pub(crate) fn check_uniform_suitable(&mut self, ty: TypeId, depth: usize) -> bool {
        enum Layout {
            Opaque,
            Struct(Vec<(sabre_ir::Ident, TypeId)>, SymRef),
            UnboundedArray,
            Array(TypeId),
            Scalar(bool),
        }
        let layout = match self.unit.types.data(ty) {
            TypeData::Sampler | TypeData::SamplerState | TypeData::Texture { .. } => Layout::Opaque,
            TypeData::Struct { sym, fields, .. } => Layout::Struct(
                fields.iter().map(|f| (f.name, f.ty)).collect(),
                *sym,
            ),
            TypeData::Array { count: -1, .. } => Layout::UnboundedArray,
            TypeData::Array { base, .. } => Layout::Array(*base),
            _ => Layout::Scalar(self.unit.types.is_uniform_scalar(ty)),
        };

        match layout {
            Layout::Opaque => depth == 0,
            Layout::Struct(fields, sym) => {
                let file = self.unit.sym(sym).file;
                let mut res = true;
                for (name, field_ty) in fields {
                    let field_ok = self.check_uniform_suitable(field_ty, depth + 1);
                    res &= field_ok;
                    if !field_ok {
                        let shown = self.display(field_ty);
                        self.err(
                            Loc::new(file, name.span),
                            format!("field type '{shown}' cannot be used for uniform"),
                        );
                    }
                }
                res
            }
            Layout::UnboundedArray => false,
            Layout::Array(base) => self.check_uniform_suitable(base, depth + 1),
            Layout::Scalar(ok) => ok,
        }
    }

    // ===== Shader I/O validation =====

    /// Validate one entry point's inputs and outputs against the
    /// shader-API legal set.
    pub(crate) fn check_entry_input(&mut self, entry: usize) {
        let (entry_sym, mode) = {
            let entry = &self.pkg().entry_points[entry];
            (entry.symbol, entry.mode)
        };
        let Some(decl_id) = self.pkg().sym(entry_sym).decl() else {
            return;
        };
        let Some(ty) = self.pkg().sym(entry_sym).ty else {
            return;
        };
        let decl = self.decl(decl_id);
        let DeclKind::Func { params, return_sign, .. } = &decl.kind else {
            return;
        };
        let file = decl.loc.file;
        let is_geometry = mode == EntryMode::Geometry;

        if is_geometry {
            let geometry = self.unit.keywords.geometry;
            let max_vertex_count = self.unit.keywords.max_vertex_count;
            let missing = decl
                .tags
                .get(geometry)
                .map(|tag| tag.arg(max_vertex_count).is_none())
                .unwrap_or(false);
            if missing {
                self.err(
                    decl.loc,
                    "geometry shader should have max vertex count tag argument '@geometry{max_vertex_count = 6, ...}'",
                );
            }
        }

        let formals = match self.unit.types.data(ty) {
            TypeData::Func(sign) => sign.args.clone(),
            _ => Vec::new(),
        };

        let mut formal = 0;
        for param in params {
            let arg_type = formals.get(formal).copied().unwrap_or(TypeId::VOID);
            formal += param.names.len();

            if self.unit.types.is_struct(arg_type) {
                self.check_entry_struct_io(arg_type);
                continue;
            }
            if let TypeData::Array { base, .. } = self.unit.types.data(arg_type) {
                let base = *base;
                if self.unit.types.is_struct(base) {
                    self.check_entry_struct_io(base);
                    continue;
                }
            }

            if !self.is_shader_api(arg_type, false, is_geometry) {
                let err_loc = Loc::new(
                    file,
                    param.names.first().map(|n| n.span).unwrap_or(param.sign.span()),
                );
                let shown = self.display(arg_type);
                self.err(err_loc, format!("type '{shown}' cannot be used as shader input"));
            }
        }

        let ret = self.func_return_type(ty);
        if is_geometry && ret != TypeId::VOID {
            let shown = self.display(ret);
            self.err(
                decl.loc,
                format!("geometry shader return type should be void, but found '{shown}'"),
            );
        }

        if self.unit.types.is_struct(ret) {
            self.check_entry_struct_output(ret);
        } else {
            let err_loc = if return_sign.is_empty() {
                decl.loc
            } else {
                Loc::new(file, return_sign.span())
            };
            if !self.is_shader_api(ret, is_geometry, false) {
                let shown = self.display(ret);
                self.err(err_loc, format!("type '{shown}' cannot be used as shader output"));
            }
        }
    }

    /// Every field of a struct used as shader input must itself be
    /// shader-API legal.
    fn check_entry_struct_io(&mut self, ty: TypeId) {
        let (fields, sym) = match self.unit.types.data(ty) {
            TypeData::Struct { fields, sym, .. } => {
                (fields.iter().map(|f| (f.name, f.ty)).collect::<Vec<_>>(), *sym)
            }
            _ => return,
        };
        let file = self.unit.sym(sym).file;
        for (name, field_ty) in fields {
            if !self.is_shader_api(field_ty, false, false) {
                let shown = self.display(field_ty);
                self.err(
                    Loc::new(file, name.span),
                    format!("type '{shown}' cannot be used as shader input"),
                );
            }
        }
    }

    /// Output structs additionally validate their system-value tags:
    /// `@sv_position` fields must be `vec4` and `@sv_depth` fields must be
    /// `float`.
    fn check_entry_struct_output(&mut self, ty: TypeId) {
        let (fields, sym) = match self.unit.types.data(ty) {
            TypeData::Struct { fields, sym, .. } => {
                (fields.iter().map(|f| (f.name, f.ty)).collect::<Vec<_>>(), *sym)
            }
            _ => return,
        };
        let file = self.unit.sym(sym).file;
        let Some(struct_decl) = self.unit.sym(sym).decl() else {
            return;
        };
        let home = PackageId(sym.package);
        let field_groups = match &self.unit.pkg(home).ast.decl(struct_decl).kind {
            DeclKind::Struct { fields, .. } => fields.clone(),
            _ => return,
        };
        let vec4 = self.unit.types.vec(TypeId::FLOAT, 4);
        let sv_position = self.unit.keywords.sv_position;
        let sv_depth = self.unit.keywords.sv_depth;

        let mut index = 0;
        for group in &field_groups {
            let Some(&(name, field_ty)) = fields.get(index) else {
                break;
            };
            index += group.names.len();

            if group.tags.has(sv_position) && field_ty != vec4 {
                let shown = self.display(field_ty);
                self.err(
                    Loc::new(file, name.span),
                    format!("system position type is '{shown}', but it should be 'vec4'"),
                );
            }
            if group.tags.has(sv_depth) && field_ty != TypeId::FLOAT {
                let shown = self.display(field_ty);
                self.err(
                    Loc::new(file, name.span),
                    format!("system depth type is '{shown}', but it should be 'float'"),
                );
            }
            if !self.is_shader_api(field_ty, false, false) {
                let shown = self.display(field_ty);
                self.err(
                    Loc::new(file, name.span),
                    format!("type '{shown}' cannot be used as shader input"),
                );
            }
        }
    }

    /// Whether a type may cross the shader API boundary: scalars, vectors,
    /// matrices, the sanctioned opaque types, and structs/arrays of such.
    fn is_shader_api(&self, ty: TypeId, allow_void: bool, allow_streams: bool) -> bool {
        match self.unit.types.data(ty) {
            TypeData::Void => allow_void,
            TypeData::Bool
            | TypeData::Int
            | TypeData::Uint
            | TypeData::Float
            | TypeData::Double
            | TypeData::Vec { .. }
            | TypeData::Mat { .. }
            | TypeData::Texture { .. }
            | TypeData::Sampler
            | TypeData::SamplerState => true,
            TypeData::Stream { .. } => allow_streams,
            TypeData::Struct { fields, .. } => {
                fields.iter().all(|f| self.is_shader_api(f.ty, false, false))
            }
            TypeData::Array { base, .. } => self.is_shader_api(*base, false, false),
            _ => false,
        }
    }
}
