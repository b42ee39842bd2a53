use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, AttributeArgs, ItemFn, NestedMeta, Meta, Lit, Pat, FnArg, Type, ReturnType,
};
use proc_macro_crate::{crate_name, FoundCrate};

/// Resolve host crate path. The host crate declares `extern crate self as mini_agent`,
/// so `::mini_agent` also works inside its own tests.
fn host_crate() -> proc_macro2::TokenStream {
    match crate_name("mini-agent") {
        Ok(FoundCrate::Name(name)) if name != "mini_agent" => {
            let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
            quote!(::#ident)
        }
        _ => quote!(::mini_agent),
    }
}

/// Turn a free function into a service function the agent can dispatch to as
/// `<service>-<name>`.
///
/// ```ignore
/// #[command(
///     service = "swapi",
///     name = "getPlanet",
///     description = "Get a planet by Id.",
///     params(id = "The id of the planet to get.")
/// )]
/// async fn get_planet(id: String) -> Result<serde_json::Value, reqwest::Error> { ... }
/// ```
///
/// Generates `GetPlanetParams` and the unit struct `GetPlanetCommand`.
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttributeArgs);
    let input_fn = parse_macro_input!(item as ItemFn);

    let mut service = None;
    let mut name_override = None;
    let mut description = None;
    let mut params_meta = Vec::<(String, String)>::new();

    for nested in args {
        match nested {
            NestedMeta::Meta(Meta::NameValue(nv)) => {
                if let Some(ident) = nv.path.get_ident() {
                    if let Lit::Str(s) = nv.lit {
                        match ident.to_string().as_str() {
                            "service" => service = Some(s.value()),
                            "name" => name_override = Some(s.value()),
                            "description" => description = Some(s.value()),
                            _ => {}
                        }
                    }
                }
            }
            NestedMeta::Meta(Meta::List(list)) if list.path.is_ident("params") => {
                for nm in list.nested {
                    if let NestedMeta::Meta(Meta::NameValue(nv)) = nm {
                        if let (Some(ident), Lit::Str(s)) =
                            (nv.path.get_ident(), &nv.lit)
                        {
                            params_meta.push((ident.to_string(), s.value()));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    let service = match service {
        Some(s) => s,
        None => {
            return syn::Error::new_spanned(
                &input_fn.sig.ident,
                "command requires `service = \"...\"`",
            )
            .to_compile_error()
            .into();
        }
    };

    let description = match description {
        Some(d) => d,
        None => {
            return syn::Error::new_spanned(
                &input_fn.sig.ident,
                "command requires `description = \"...\"`",
            )
            .to_compile_error()
            .into();
        }
    };

    let fn_ident = input_fn.sig.ident.clone();
    let fn_name = fn_ident.to_string();
    let command_name = name_override.unwrap_or_else(|| fn_name.clone());

    if service.is_empty() || service.contains('-') || command_name.is_empty() || command_name.contains('-') {
        return syn::Error::new_spanned(
            &input_fn.sig.ident,
            "service and name must be non-empty and must not contain '-'",
        )
        .to_compile_error()
        .into();
    }

    let mut fields = Vec::new();
    let mut param_names = Vec::new();

    for arg in &input_fn.sig.inputs {
        match arg {
            FnArg::Typed(pt) => {
                if let Pat::Ident(pi) = &*pt.pat {
                    fields.push((pi.ident.clone(), (*pt.ty).clone()));
                    param_names.push(pi.ident.to_string());
                } else {
                    return syn::Error::new_spanned(
                        &pt.pat,
                        "only simple identifiers are supported",
                    )
                    .to_compile_error()
                    .into();
                }
            }
            FnArg::Receiver(_) => {
                return syn::Error::new_spanned(
                    arg,
                    "methods with self are not supported",
                )
                .to_compile_error()
                .into();
            }
        }
    }

    for (k, _) in &params_meta {
        if !param_names.contains(k) {
            return syn::Error::new_spanned(
                &input_fn.sig.ident,
                format!("param '{}' not found in function signature", k),
            )
            .to_compile_error()
            .into();
        }
    }

    let params_struct_ident =
        syn::Ident::new(&format!("{}Params", pascal_case(&fn_name)), fn_ident.span());
    let command_struct_ident =
        syn::Ident::new(&format!("{}Command", pascal_case(&fn_name)), fn_ident.span());

    let host = host_crate();
    let serde_path = syn::LitStr::new(
        &format!("{}::serde", host.to_string().replace(' ', "")),
        proc_macro2::Span::call_site(),
    );

    let field_defs = fields.iter().map(|(id, ty)| {
        quote!(pub #id: #ty)
    });

    let args_entries = fields.iter().map(|(ident, ty)| {
        let desc = params_meta
            .iter()
            .find(|(k, _)| k == &ident.to_string())
            .map(|(_, v)| v.clone())
            .unwrap_or_default();

        if desc.is_empty() {
            return syn::Error::new_spanned(
                ident,
                format!("missing description for param '{}'", ident),
            )
            .to_compile_error();
        }

        let arg_type = infer_json_type(ty);
        let required = !is_option(ty);
        let name_lit = syn::LitStr::new(&ident.to_string(), ident.span());
        let desc_lit = syn::LitStr::new(&desc, ident.span());

        quote! {
            #host::services::traits::ArgSchema {
                name: #name_lit.into(),
                arg_type: #arg_type.into(),
                description: #desc_lit.into(),
                required: #required,
            }
        }
    });

    let call_args = fields.iter().map(|(id, _)| quote!(params.#id));
    let call = if input_fn.sig.asyncness.is_some() {
        quote!(#fn_ident(#(#call_args),*).await)
    } else {
        quote!(#fn_ident(#(#call_args),*))
    };
    let full_name = format!("{}-{}", service, command_name);

    let output = if returns_result(&input_fn.sig.output) {
        quote! {
            match #call {
                Ok(value) => Ok(#host::serde_json::to_value(value)?),
                Err(e) => Err(#host::services::error::ServiceError::execution(#full_name, e)),
            }
        }
    } else {
        quote!(Ok(#host::serde_json::to_value(#call)?))
    };

    let expanded = quote! {
        #input_fn

        #[derive(#host::serde::Deserialize)]
        #[serde(crate = #serde_path)]
        pub struct #params_struct_ident {
            #(#field_defs,)*
        }

        pub struct #command_struct_ident;

        #[#host::async_trait::async_trait]
        impl #host::services::traits::ServiceFunction for #command_struct_ident {
            fn service(&self) -> &str { #service }
            fn name(&self) -> &str { #command_name }
            fn description(&self) -> &str { #description }
            fn args(&self) -> Vec<#host::services::traits::ArgSchema> {
                vec![#(#args_entries),*]
            }
            #[allow(unused_variables)]
            async fn run(
                &self,
                input: #host::serde_json::Value,
            ) -> Result<#host::serde_json::Value, #host::services::error::ServiceError> {
                let params: #params_struct_ident =
                    #host::serde_json::from_value(input)
                        .map_err(|e| #host::services::error::ServiceError::ParamsNotMatched(e.to_string()))?;
                #output
            }
        }
    };

    TokenStream::from(expanded)
}

fn pascal_case(s: &str) -> String {
    s.split('_')
        .map(|p| {
            let mut c = p.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(p) => p.path.segments.last(),
        _ => None,
    }
}

fn is_option(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|seg| seg.ident == "Option")
}

fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => last_segment(ty).is_some_and(|seg| seg.ident == "Result"),
        ReturnType::Default => false,
    }
}

fn infer_json_type(ty: &Type) -> &'static str {
    let Some(seg) = last_segment(ty) else {
        return "object";
    };
    match seg.ident.to_string().as_str() {
        "String" => "string",
        "bool" => "boolean",
        "i8" | "i16" | "i32" | "i64" |
        "u8" | "u16" | "u32" | "u64" |
        "usize" | "isize" => "integer",
        "f32" | "f64" => "number",
        "Vec" => "array",
        "Option" => match &seg.arguments {
            syn::PathArguments::AngleBracketed(args) => match args.args.first() {
                Some(syn::GenericArgument::Type(inner)) => infer_json_type(inner),
                _ => "object",
            },
            _ => "object",
        },
        _ => "object",
    }
}
