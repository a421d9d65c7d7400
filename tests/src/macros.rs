#[macro_export]
macro_rules! collections {
    (
        $( $collection:expr ),* $(,)?
    ) => {{
        strata::schema::app::Schema::builder()
            $( .collection($collection) )*
            .build()
            .unwrap()
    }};
}

#[macro_export]
macro_rules! record {
    (
        $( $name:literal => $value:expr ),* $(,)?
    ) => {{
        #[allow(unused_mut)]
        let mut record = strata::Record::new();
        $( record.insert($name, $value); )*
        record
    }};
}

/// Expands each async test function into one `#[test]` per enabled backend.
#[macro_export]
macro_rules! tests {
    (
        $(
            $( #[$attrs:meta] )*
            $f:ident
        ),+
    ) => {
        #[cfg(feature = "sqlite")]
        mod sqlite {
            $(
                #[test]
                $( #[$attrs] )*
                fn $f() {
                    let mut test = $crate::DbTest::new(
                        Box::new($crate::db::sqlite::SetupSqlite::new())
                    );

                    test.run_test(move |test| Box::pin(async move {
                        super::$f(test).await;
                    }));
                }
            )*
        }

        #[cfg(feature = "serverless")]
        mod serverless {
            $(
                #[test]
                $( #[$attrs] )*
                fn $f() {
                    let mut test = $crate::DbTest::new(
                        Box::new($crate::db::serverless::SetupServerless::new())
                    );

                    test.run_test(move |test| Box::pin(async move {
                        super::$f(test).await;
                    }));
                }
            )*
        }

        #[cfg(feature = "postgresql")]
        mod postgresql {
            $(
                #[test]
                $( #[$attrs] )*
                fn $f() {
                    let mut test = $crate::DbTest::new(
                        Box::new($crate::db::postgresql::SetupPostgreSQL::new())
                    );

                    test.run_test(move |test| Box::pin(async move {
                        super::$f(test).await;
                    }));
                }
            )*
        }
    };
    (
        $(
            $( #[$attrs:meta] )*
            $f:ident,
        )+
    ) => {
        $crate::tests!( $(
            $( #[$attrs] )*
            $f
        ),+ );
    }
}
