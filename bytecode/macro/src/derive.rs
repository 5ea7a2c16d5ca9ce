/*
 *     This file is part of Classweave.
 *
 *     Classweave is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Lesser General Public License as published by
 *     the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     Classweave is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU General Public License for more details.
 *
 *     You should have received a copy of the GNU Lesser General Public License
 *     along with Classweave. (LICENSE.md)  If not, see <https://www.gnu.org/licenses/>.
 */

use proc_macro2::{Ident, Literal, Span, TokenStream as TokenStream2};
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::*;

/// Generated snippets for one field.
struct FieldCode {
    read: TokenStream2,
    write: TokenStream2,
    size: TokenStream2,
}

pub(crate) fn generate_idents_for_fields(fields: &Fields) -> Vec<Ident> {
    match fields {
        Fields::Named(FieldsNamed { named, .. }) => named
            .iter()
            .filter_map(|f| f.ident.clone())
            .collect::<Vec<_>>(),
        Fields::Unnamed(v) => {
            fn num_to_str(mut n: usize) -> Ident {
                let map = "ABCDEFGHIJKLMNOPQRSTUVWXYZ".as_bytes(); // using all caps to avoid clash with keywords
                let size = map.len();
                let mut str = String::new();
                loop {
                    let m = n % size;
                    n /= size;
                    str.push(map[m] as char);
                    if n == 0 {
                        break;
                    }
                }
                Ident::new(&str, Span::call_site())
            }
            (0..v.unnamed.len()).map(num_to_str).collect()
        }
        Fields::Unit => Vec::new(),
    }
}

/// Returns the element type if `ty` is written as `Vec<T>`.
fn vec_element(ty: &Type) -> Option<&Type> {
    if let Type::Path(p) = ty {
        let last = p.path.segments.last()?;
        if last.ident != "Vec" {
            return None;
        }
        if let PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. }) =
            &last.arguments
        {
            if let Some(GenericArgument::Type(inner)) = args.first() {
                return Some(inner);
            }
        }
    }
    None
}

fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|a| a.path.is_ident(name))
}

/// `receiver` must be an expression of type `&FieldType`.
fn field_code(f: &Field, receiver: TokenStream2) -> Result<FieldCode> {
    let ty = &f.ty;
    let span = ty.span();
    if let Some(elem) = vec_element(ty) {
        let len_ty: Type = find_attr(&f.attrs, "vec_len_type")
            .ok_or_else(|| Error::new(f.span(), "Missing vec_len_type attribute"))?
            .parse_args()?;
        let elem_rw = quote_spanned! { span => <#elem as crate::ReadWrite> };
        let len_rw = quote_spanned! { span => <#len_ty as crate::ReadWrite> };
        return Ok(FieldCode {
            read: quote! {{
                let len = #len_rw::read_from(reader)? as usize;
                let mut vec = Vec::with_capacity(len.min(crate::rw::PREALLOCATION_LIMIT));
                for _ in 0..len {
                    vec.push(#elem_rw::read_from(reader)?);
                }
                vec
            }},
            write: quote! {{
                let items = #receiver;
                let len = <#len_ty as std::convert::TryFrom<usize>>::try_from(items.len())
                    .map_err(|_| crate::error::Error::ArithmeticOverflow)?;
                #len_rw::write_to(&len, writer)?;
                for it in items.iter() {
                    #elem_rw::write_to(it, writer)?;
                }
            }},
            size: quote! {
                (std::mem::size_of::<#len_ty>() + (#receiver).iter().map(#elem_rw::size).sum::<usize>())
            },
        });
    }
    let rw = quote_spanned! { span => <#ty as crate::ReadWrite> };
    Ok(FieldCode {
        read: quote! { #rw::read_from(reader)? },
        write: quote! { #rw::write_to(#receiver, writer)?; },
        size: quote! { #rw::size(#receiver) },
    })
}

fn construct(path: TokenStream2, fields: &Fields, idents: &[Ident]) -> TokenStream2 {
    match fields {
        Fields::Named(_) => quote! { #path { #(#idents),* } },
        Fields::Unnamed(_) => quote! { #path( #(#idents),* ) },
        Fields::Unit => quote! { #path },
    }
}

/// Accepts integer, byte (`b'B'`) and char (`'B'`) literals.
fn tag_of(v: &Variant) -> Result<Option<i64>> {
    if let Some(a) = find_attr(&v.attrs, "tag") {
        return match a.parse_args::<Lit>()? {
            Lit::Int(i) => i.base10_parse().map(Some),
            Lit::Byte(b) => Ok(Some(b.value() as i64)),
            Lit::Char(c) => Ok(Some(c.value() as i64)),
            other => Err(Error::new(other.span(), "expected an integer, byte or char literal")),
        };
    }
    if let Some((_, Expr::Lit(ExprLit { lit: Lit::Int(l), .. }))) = &v.discriminant {
        return l.base10_parse().map(Some);
    }
    Ok(None)
}

pub(crate) fn derive_readwrite_inner(input: DeriveInput) -> Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    match &input.data {
        Data::Struct(s) => {
            let idents = generate_idents_for_fields(&s.fields);
            let codes = s
                .fields
                .iter()
                .enumerate()
                .map(|(n, f)| {
                    let receiver = match &f.ident {
                        Some(id) => quote! { &self.#id },
                        None => {
                            let idx = Index::from(n);
                            quote! { &self.#idx }
                        }
                    };
                    field_code(f, receiver)
                })
                .collect::<Result<Vec<_>>>()?;
            let reads = codes.iter().map(|c| &c.read);
            let writes = codes.iter().map(|c| &c.write);
            let sizes = codes.iter().map(|c| &c.size);
            let construct = construct(quote!(Self), &s.fields, &idents);
            Ok(quote! {
                #[allow(non_snake_case)]
                impl #impl_generics crate::ReadWrite for #name #ty_generics #where_clause {
                    fn read_from<Reader: std::io::Read>(reader: &mut Reader) -> crate::error::Result<Self> {
                        #(let #idents = #reads;)*
                        Ok(#construct)
                    }
                    fn write_to<Writer: std::io::Write>(&self, writer: &mut Writer) -> crate::error::Result<()> {
                        #(#writes)*
                        Ok(())
                    }
                    fn size(&self) -> usize {
                        0 #(+ #sizes)*
                    }
                }
            })
        }
        Data::Enum(e) => {
            let tag_type: Type = find_attr(&input.attrs, "tag_type")
                .ok_or_else(|| Error::new(input.span(), "Couldn't find tag_type attribute"))?
                .parse_args()?;
            let tag_rw = {
                let span = tag_type.span();
                quote_spanned! { span => <#tag_type as crate::ReadWrite> }
            };

            let mut next = 0i64;
            let mut tags = Vec::new();
            let mut read_arms = Vec::new();
            let mut write_arms = Vec::new();
            let mut size_arms = Vec::new();
            for v in &e.variants {
                let tag = tag_of(v)?.unwrap_or(next);
                next = tag + 1;
                let lit = Literal::i64_unsuffixed(tag);
                if tags.contains(&tag) {
                    return Err(Error::new(v.span(), format!("duplicate tag {}", tag)));
                }
                tags.push(tag);

                let idents = generate_idents_for_fields(&v.fields);
                let codes = v
                    .fields
                    .iter()
                    .zip(idents.iter())
                    .map(|(f, id)| field_code(f, quote!(#id)))
                    .collect::<Result<Vec<_>>>()?;
                let variant = &v.ident;
                let pattern = construct(quote!(Self::#variant), &v.fields, &idents);
                let reads = codes.iter().map(|c| &c.read);
                let writes = codes.iter().map(|c| &c.write);
                let sizes = codes.iter().map(|c| &c.size);
                read_arms.push(quote! {
                    #lit => {
                        #(let #idents = #reads;)*
                        Ok(#pattern)
                    }
                });
                write_arms.push(quote! {
                    #pattern => {
                        #tag_rw::write_to(&#lit, writer)?;
                        #(#writes)*
                        Ok(())
                    }
                });
                size_arms.push(quote! {
                    #pattern => std::mem::size_of::<#tag_type>() #(+ #sizes)*
                });
            }
            Ok(quote! {
                #[allow(non_snake_case)]
                impl #impl_generics crate::ReadWrite for #name #ty_generics #where_clause {
                    fn read_from<Reader: std::io::Read>(reader: &mut Reader) -> crate::error::Result<Self> {
                        let tag = #tag_rw::read_from(reader)?;
                        match tag {
                            #(#read_arms)*
                            _ => Err(crate::error::Error::Invalid(
                                concat!(stringify!(#name), " tag"),
                                tag.to_string(),
                            )),
                        }
                    }
                    fn write_to<Writer: std::io::Write>(&self, writer: &mut Writer) -> crate::error::Result<()> {
                        match self {
                            #(#write_arms)*
                        }
                    }
                    fn size(&self) -> usize {
                        match self {
                            #(#size_arms,)*
                        }
                    }
                }
            })
        }
        Data::Union(_) => Err(Error::new(
            input.span(),
            "This macro should not be used on a union type",
        )),
    }
}
