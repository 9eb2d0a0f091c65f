use darling::{ast, FromMeta};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};

#[derive(FromMeta)]
struct RouteArgs {
	#[darling(multiple)]
	tag: Vec<syn::Expr>,
	#[darling(multiple)]
	response: Vec<ResponseArgs>,
}

/// An extra documented response, e.g. `response(status = 404, description = "...")`.
#[derive(FromMeta)]
struct ResponseArgs {
	status: syn::LitInt,
	shape: Option<syn::Type>,
	description: Option<String>,
}

impl ResponseArgs {
	fn transform(&self) -> TokenStream2 {
		let status = &self.status;
		let shape = self
			.shape
			.as_ref()
			.map_or_else(|| quote!(()), |shape| quote!(#shape));

		match &self.description {
			Some(description) => quote! {
				.response_with::<#status, #shape, _>(|res| res.description(#description))
			},
			None => quote! {
				.response::<#status, #shape>()
			},
		}
	}
}

/// The summary and description of a route, taken from its doc comment.
struct RouteDocs {
	summary: String,
	description: String,
}

impl RouteDocs {
	/// The first non-empty line is the summary and the remaining lines, joined, are the description.
	/// Routes documented with a single line reuse the summary as their description.
	fn from_attrs(attrs: &[syn::Attribute]) -> Option<Self> {
		let mut lines = attrs
			.iter()
			.filter(|attr| attr.path().is_ident("doc"))
			.filter_map(|attr| match &attr.meta {
				syn::Meta::NameValue(syn::MetaNameValue {
					value:
						syn::Expr::Lit(syn::ExprLit {
							lit: syn::Lit::Str(text),
							..
						}),
					..
				}) => Some(text.value().trim().to_owned()),
				_ => None,
			})
			.filter(|line| !line.is_empty());

		let summary = lines.next()?;
		let rest = lines.collect::<Vec<_>>();
		let description = if rest.is_empty() {
			summary.clone()
		} else {
			rest.join(" ")
		};

		Some(Self {
			summary,
			description,
		})
	}
}

pub fn from_input(args: TokenStream, input: TokenStream) -> TokenStream {
	let args = match ast::NestedMeta::parse_meta_list(args.into()) {
		Ok(args) => args,
		Err(error) => return error.into_compile_error().into(),
	};

	let args = match RouteArgs::from_list(&args) {
		Ok(args) => args,
		Err(error) => return error.write_errors().into(),
	};

	let function = syn::parse_macro_input!(input as syn::ItemFn);

	expand(&args, &function)
		.unwrap_or_else(syn::Error::into_compile_error)
		.into()
}

/// Emits the handler unchanged, followed by a `<handler>_docs` transform for `api_route_with`.
fn expand(args: &RouteArgs, function: &syn::ItemFn) -> syn::Result<TokenStream2> {
	let RouteDocs {
		summary,
		description,
	} = RouteDocs::from_attrs(&function.attrs).ok_or_else(|| {
		syn::Error::new_spanned(&function.sig.ident, "routes must have a doc comment")
	})?;

	let docs_fn = format_ident!("{}_docs", function.sig.ident);
	let vis = &function.vis;
	let tags = &args.tag;
	let responses = args.response.iter().map(ResponseArgs::transform);

	Ok(quote! {
		#function

		#vis fn #docs_fn(op: aide::transform::TransformOperation) -> aide::transform::TransformOperation {
			op.summary(#summary)
				.description(#description)
				#(.tag(#tags))*
				#(#responses)*
		}
	})
}
